//! Recipe API handlers.
//!
//! ```text
//! GET   /api/recipe/recipes?tags=1,2&ingredients=3
//! POST  /api/recipe/recipes {"title":"Pho","timeMinutes":45,"price":"12.50","tags":[1]}
//! GET   /api/recipe/recipes/{id}
//! PUT   /api/recipe/recipes/{id}
//! PATCH /api/recipe/recipes/{id}
//! POST  /api/recipe/recipes/{id}/upload-image
//! ```
//!
//! List responses use the summary projection (association ids only);
//! creation and item endpoints return the detail projection with
//! embedded tag and ingredient objects.

use actix_multipart::form::bytes::Bytes as MultipartBytes;
use actix_multipart::form::MultipartForm;
use actix_web::{get, patch, post, put, web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::RecipePersistenceError;
use crate::domain::{
    Error, IngredientId, Recipe, RecipeDetail, RecipeDraft, RecipeFilter, RecipeId, RecipePatch,
    TagId,
};
use crate::inbound::http::ingredients::IngredientBody;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::tags::TagBody;
use crate::inbound::http::validation::{parse_id_csv, required_text, required_value, FieldName};
use crate::inbound::http::ApiResult;

const TITLE: FieldName = FieldName::new("title");
const TIME_MINUTES: FieldName = FieldName::new("timeMinutes");
const PRICE: FieldName = FieldName::new("price");
const TAGS: FieldName = FieldName::new("tags");
const INGREDIENTS: FieldName = FieldName::new("ingredients");

/// Summary projection for list responses.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummaryBody {
    /// Stable identifier.
    pub id: i64,
    /// Recipe title.
    pub title: String,
    /// Preparation time in minutes.
    pub time_minutes: i32,
    /// Price, serialised as a decimal string.
    pub price: Decimal,
    /// Stored image reference, when uploaded.
    pub image: Option<String>,
    /// Ids of associated tags.
    pub tags: Vec<i64>,
    /// Ids of associated ingredients.
    pub ingredients: Vec<i64>,
}

impl From<Recipe> for RecipeSummaryBody {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id.0,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            image: recipe.image,
            tags: recipe.tag_ids.into_iter().map(|id| id.0).collect(),
            ingredients: recipe.ingredient_ids.into_iter().map(|id| id.0).collect(),
        }
    }
}

/// Detail projection with embedded association objects.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetailBody {
    /// Stable identifier.
    pub id: i64,
    /// Recipe title.
    pub title: String,
    /// Preparation time in minutes.
    pub time_minutes: i32,
    /// Price, serialised as a decimal string.
    pub price: Decimal,
    /// Stored image reference, when uploaded.
    pub image: Option<String>,
    /// Associated tags, in full.
    pub tags: Vec<TagBody>,
    /// Associated ingredients, in full.
    pub ingredients: Vec<IngredientBody>,
}

impl From<RecipeDetail> for RecipeDetailBody {
    fn from(detail: RecipeDetail) -> Self {
        Self {
            id: detail.id.0,
            title: detail.title,
            time_minutes: detail.time_minutes,
            price: detail.price,
            image: detail.image,
            tags: detail.tags.into_iter().map(TagBody::from).collect(),
            ingredients: detail
                .ingredients
                .into_iter()
                .map(IngredientBody::from)
                .collect(),
        }
    }
}

/// Write body for creation and full replacement. All fields optional so
/// validation can name which required field is missing.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeWriteRequest {
    /// Recipe title; required, must not be blank.
    pub title: Option<String>,
    /// Preparation time in minutes; required.
    pub time_minutes: Option<i32>,
    /// Price; required.
    pub price: Option<Decimal>,
    /// Tag ids to associate; omitted means none.
    pub tags: Option<Vec<i64>>,
    /// Ingredient ids to associate; omitted means none.
    pub ingredients: Option<Vec<i64>>,
}

/// Merge-patch body: only supplied fields change.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatchRequest {
    /// Replacement title, when supplied; must not be blank.
    pub title: Option<String>,
    /// Replacement preparation time, when supplied.
    pub time_minutes: Option<i32>,
    /// Replacement price, when supplied.
    pub price: Option<Decimal>,
    /// Replacement tag id set, when supplied.
    pub tags: Option<Vec<i64>>,
    /// Replacement ingredient id set, when supplied.
    pub ingredients: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    tags: Option<String>,
    ingredients: Option<String>,
}

/// Multipart form for the image upload endpoint.
#[derive(Debug, MultipartForm)]
pub struct UploadImageForm {
    /// Raw image payload; must decode as an image.
    #[multipart(limit = "10MB")]
    pub image: MultipartBytes,
}

fn draft_from(payload: RecipeWriteRequest) -> Result<RecipeDraft, Error> {
    Ok(RecipeDraft {
        title: required_text(payload.title, TITLE)?,
        time_minutes: required_value(payload.time_minutes, TIME_MINUTES)?,
        price: required_value(payload.price, PRICE)?,
        tag_ids: payload
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(TagId)
            .collect(),
        ingredient_ids: payload
            .ingredients
            .unwrap_or_default()
            .into_iter()
            .map(IngredientId)
            .collect(),
    })
}

fn patch_from(payload: RecipePatchRequest) -> Result<RecipePatch, Error> {
    let title = payload
        .title
        .map(|title| required_text(Some(title), TITLE))
        .transpose()?;
    Ok(RecipePatch {
        title,
        time_minutes: payload.time_minutes,
        price: payload.price,
        tag_ids: payload
            .tags
            .map(|ids| ids.into_iter().map(TagId).collect()),
        ingredient_ids: payload
            .ingredients
            .map(|ids| ids.into_iter().map(IngredientId).collect()),
    })
}

fn filter_from(query: ListQuery) -> Result<RecipeFilter, Error> {
    let tag_ids = match query.tags.as_deref() {
        Some(raw) => parse_id_csv(raw, TAGS)?.into_iter().map(TagId).collect(),
        None => Vec::new(),
    };
    let ingredient_ids = match query.ingredients.as_deref() {
        Some(raw) => parse_id_csv(raw, INGREDIENTS)?
            .into_iter()
            .map(IngredientId)
            .collect(),
        None => Vec::new(),
    };
    Ok(RecipeFilter {
        tag_ids,
        ingredient_ids,
    })
}

fn map_recipe_error(err: RecipePersistenceError) -> Error {
    match err {
        RecipePersistenceError::UnknownTag { id } => {
            Error::invalid_request(format!("tag {id} does not exist")).with_details(json!({
                "field": "tags",
                "code": "unknown_id",
                "value": id,
            }))
        }
        RecipePersistenceError::UnknownIngredient { id } => {
            Error::invalid_request(format!("ingredient {id} does not exist")).with_details(json!({
                "field": "ingredients",
                "code": "unknown_id",
                "value": id,
            }))
        }
        other => Error::internal(other.to_string()),
    }
}

fn recipe_not_found() -> Error {
    Error::not_found("recipe not found")
}

fn require_detail(
    result: Result<Option<RecipeDetail>, RecipePersistenceError>,
) -> ApiResult<RecipeDetailBody> {
    result
        .map_err(map_recipe_error)?
        .map(RecipeDetailBody::from)
        .ok_or_else(recipe_not_found)
}

/// List the caller's recipes, newest first.
#[utoipa::path(
    get,
    path = "/api/recipe/recipes",
    params(
        ("tags" = Option<String>, Query, description = "Comma-separated tag ids; keeps recipes carrying any of them"),
        ("ingredients" = Option<String>, Query, description = "Comma-separated ingredient ids; keeps recipes carrying any of them")
    ),
    responses(
        (status = 200, description = "Recipes owned by the caller", body = [RecipeSummaryBody]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipe"],
    operation_id = "listRecipes"
)]
#[get("/recipes")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Vec<RecipeSummaryBody>>> {
    let owner = session.require_user_id()?;
    let filter = filter_from(query.into_inner())?;
    let rows = state
        .recipes
        .list(owner, &filter)
        .await
        .map_err(map_recipe_error)?;
    Ok(web::Json(
        rows.into_iter().map(RecipeSummaryBody::from).collect(),
    ))
}

/// Create a recipe owned by the caller.
#[utoipa::path(
    post,
    path = "/api/recipe/recipes",
    request_body = RecipeWriteRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeDetailBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipe"],
    operation_id = "createRecipe"
)]
#[post("/recipes")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecipeWriteRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let draft = draft_from(payload.into_inner())?;
    let detail = state
        .recipes
        .create(owner, draft)
        .await
        .map_err(map_recipe_error)?;
    Ok(HttpResponse::Created().json(RecipeDetailBody::from(detail)))
}

/// Fetch one recipe in full.
#[utoipa::path(
    get,
    path = "/api/recipe/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe detail", body = RecipeDetailBody),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipe"],
    operation_id = "getRecipe"
)]
#[get("/recipes/{id}")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<RecipeDetailBody>> {
    let owner = session.require_user_id()?;
    let id = RecipeId(path.into_inner());
    let detail = require_detail(state.recipes.find(owner, id).await)?;
    Ok(web::Json(detail))
}

/// Fully replace a recipe. Unsupplied association lists reset to empty;
/// the stored image changes only via the upload endpoint.
#[utoipa::path(
    put,
    path = "/api/recipe/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeWriteRequest,
    responses(
        (status = 200, description = "Recipe replaced", body = RecipeDetailBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipe"],
    operation_id = "replaceRecipe"
)]
#[put("/recipes/{id}")]
pub async fn replace_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<RecipeWriteRequest>,
) -> ApiResult<web::Json<RecipeDetailBody>> {
    let owner = session.require_user_id()?;
    let id = RecipeId(path.into_inner());
    let draft = draft_from(payload.into_inner())?;
    let detail = require_detail(state.recipes.replace(owner, id, draft).await)?;
    Ok(web::Json(detail))
}

/// Merge-patch a recipe: only supplied fields change.
#[utoipa::path(
    patch,
    path = "/api/recipe/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipePatchRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeDetailBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipe"],
    operation_id = "patchRecipe"
)]
#[patch("/recipes/{id}")]
pub async fn patch_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<RecipePatchRequest>,
) -> ApiResult<web::Json<RecipeDetailBody>> {
    let owner = session.require_user_id()?;
    let id = RecipeId(path.into_inner());
    let patch = patch_from(payload.into_inner())?;
    let detail = require_detail(state.recipes.patch(owner, id, patch).await)?;
    Ok(web::Json(detail))
}

fn invalid_image() -> Error {
    Error::invalid_request("payload could not be decoded as an image")
        .with_details(json!({ "field": "image", "code": "invalid_image" }))
}

/// Attach an image to a recipe. The payload must decode as an image;
/// the stored reference is returned in the detail body.
#[utoipa::path(
    post,
    path = "/api/recipe/recipes/{id}/upload-image",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = RecipeDetailBody),
        (status = 400, description = "Payload is not a decodable image", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipe"],
    operation_id = "uploadRecipeImage"
)]
#[post("/recipes/{id}/upload-image")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    form: MultipartForm<UploadImageForm>,
) -> ApiResult<web::Json<RecipeDetailBody>> {
    let owner = session.require_user_id()?;
    let id = RecipeId(path.into_inner());
    // The recipe must exist for this owner before any bytes land on
    // disk.
    state
        .recipes
        .find(owner, id)
        .await
        .map_err(map_recipe_error)?
        .ok_or_else(recipe_not_found)?;

    let bytes = &form.image.data;
    let format = image::guess_format(bytes).map_err(|_| invalid_image())?;
    image::load_from_memory_with_format(bytes, format).map_err(|_| invalid_image())?;
    let extension = format.extensions_str().first().copied().unwrap_or("bin");

    let reference = state
        .images
        .store_recipe_image(id, extension, bytes)
        .await
        .map_err(|err| Error::internal(err.to_string()))?;
    let detail = require_detail(state.recipes.set_image(owner, id, &reference).await)?;
    Ok(web::Json(detail))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, web, App};
    use rstest::rstest;
    use serde_json::{json, Value};

    use super::*;
    use crate::test_support::{memory_state, register_and_login, test_session_middleware};

    fn test_app(
        state: web::Data<crate::inbound::http::state::HttpState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(test_session_middleware())
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/user")
                            .service(crate::inbound::http::users::login)
                            .service(crate::inbound::http::users::register),
                    )
                    .service(
                        web::scope("/recipe")
                            .service(crate::inbound::http::tags::create_tag)
                            .service(crate::inbound::http::ingredients::create_ingredient)
                            .service(list_recipes)
                            .service(create_recipe)
                            .service(get_recipe)
                            .service(replace_recipe)
                            .service(patch_recipe)
                            .service(upload_image),
                    ),
            )
    }

    async fn post_json(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        uri: &str,
        body: Value,
    ) -> (StatusCode, Value) {
        let response = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri(uri)
                .cookie(cookie.clone())
                .set_json(body)
                .to_request(),
        )
        .await;
        let status = response.status();
        let value = serde_json::from_slice(&actix_test::read_body(response).await)
            .unwrap_or(Value::Null);
        (status, value)
    }

    fn recipe_body(title: &str) -> Value {
        json!({ "title": title, "timeMinutes": 30, "price": "5.25" })
    }

    fn png_bytes() -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::new_rgb8(4, 4)
            .write_to(&mut buffer, image::ImageFormat::Png)
            .expect("encode png");
        buffer.into_inner()
    }

    fn multipart_request(
        uri: &str,
        cookie: &actix_web::cookie::Cookie<'static>,
        payload: &[u8],
    ) -> actix_http::Request {
        let boundary = "larder-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"upload.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        actix_test::TestRequest::post()
            .uri(uri)
            .cookie(cookie.clone())
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            ))
            .set_payload(body)
            .to_request()
    }

    #[actix_web::test]
    async fn create_returns_detail_with_embedded_associations() {
        let (state, _media) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_login(&app, "cook@test.ir", "pw").await;

        let (_, tag) =
            post_json(&app, &cookie, "/api/recipe/tags", json!({ "name": "Soup" })).await;
        let (status, value) = post_json(
            &app,
            &cookie,
            "/api/recipe/recipes",
            json!({
                "title": "Pho",
                "timeMinutes": 45,
                "price": "12.50",
                "tags": [tag["id"]],
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(value["title"], "Pho");
        assert_eq!(value["timeMinutes"], 45);
        assert_eq!(value["price"], "12.50");
        assert_eq!(value["tags"][0]["name"], "Soup");
        assert!(value["image"].is_null());
    }

    #[rstest]
    #[case(json!({ "timeMinutes": 5, "price": "1.00" }), "title", "required")]
    #[case(json!({ "title": " ", "timeMinutes": 5, "price": "1.00" }), "title", "blank")]
    #[case(json!({ "title": "x", "price": "1.00" }), "timeMinutes", "required")]
    #[case(json!({ "title": "x", "timeMinutes": 5 }), "price", "required")]
    #[actix_web::test]
    async fn create_validates_required_fields(
        #[case] body: Value,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let (state, _media) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_login(&app, "cook@test.ir", "pw").await;

        let (status, value) = post_json(&app, &cookie, "/api/recipe/recipes", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["details"]["field"], field);
        assert_eq!(value["details"]["code"], code);
    }

    #[actix_web::test]
    async fn unknown_association_ids_are_per_field_failures() {
        let (state, _media) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_login(&app, "cook@test.ir", "pw").await;

        let (status, value) = post_json(
            &app,
            &cookie,
            "/api/recipe/recipes",
            json!({ "title": "x", "timeMinutes": 5, "price": "1.00", "tags": [99] }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["details"]["field"], "tags");
        assert_eq!(value["details"]["code"], "unknown_id");
        assert_eq!(value["details"]["value"], 99);
    }

    #[actix_web::test]
    async fn list_is_newest_first_and_honours_filters() {
        let (state, _media) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_login(&app, "cook@test.ir", "pw").await;

        let (_, tag) =
            post_json(&app, &cookie, "/api/recipe/tags", json!({ "name": "Thai" })).await;
        let (_, first) =
            post_json(&app, &cookie, "/api/recipe/recipes", recipe_body("Toast")).await;
        let (_, second) = post_json(
            &app,
            &cookie,
            "/api/recipe/recipes",
            json!({ "title": "Curry", "timeMinutes": 40, "price": "9.00", "tags": [tag["id"]] }),
        )
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/recipe/recipes")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("json");
        let ids: Vec<i64> = value
            .as_array()
            .expect("array")
            .iter()
            .map(|row| row["id"].as_i64().expect("id"))
            .collect();
        assert_eq!(
            ids,
            [second["id"].as_i64().expect("id"), first["id"].as_i64().expect("id")]
        );
        // Summary projection: association ids, not objects.
        assert_eq!(value[0]["tags"][0], tag["id"]);

        let uri = format!("/api/recipe/recipes?tags={}", tag["id"]);
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&uri)
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let filtered: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("json");
        let rows = filtered.as_array().expect("array");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "Curry");
    }

    #[actix_web::test]
    async fn malformed_filter_ids_are_rejected() {
        let (state, _media) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_login(&app, "cook@test.ir", "pw").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/recipe/recipes?tags=1,abc")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("json");
        assert_eq!(value["details"]["field"], "tags");
        assert_eq!(value["details"]["index"], 1);
    }

    #[actix_web::test]
    async fn other_owners_recipes_are_not_found() {
        let (state, _media) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let alice = register_and_login(&app, "alice@test.ir", "pw").await;
        let bob = register_and_login(&app, "bob@test.ir", "pw").await;

        let (_, created) =
            post_json(&app, &alice, "/api/recipe/recipes", recipe_body("Mine")).await;
        let uri = format!("/api/recipe/recipes/{}", created["id"]);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(&uri).cookie(bob).to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(&uri).cookie(alice).to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn patch_changes_only_supplied_fields() {
        let (state, _media) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_login(&app, "cook@test.ir", "pw").await;

        let (_, tag) =
            post_json(&app, &cookie, "/api/recipe/tags", json!({ "name": "Keep" })).await;
        let (_, created) = post_json(
            &app,
            &cookie,
            "/api/recipe/recipes",
            json!({ "title": "Old", "timeMinutes": 30, "price": "5.25", "tags": [tag["id"]] }),
        )
        .await;

        let uri = format!("/api/recipe/recipes/{}", created["id"]);
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::patch()
                .uri(&uri)
                .cookie(cookie)
                .set_json(json!({ "title": "New" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("json");
        assert_eq!(value["title"], "New");
        assert_eq!(value["timeMinutes"], 30);
        assert_eq!(value["tags"][0]["name"], "Keep");
    }

    #[actix_web::test]
    async fn put_resets_associations_but_keeps_the_image() {
        let (state, _media) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_login(&app, "cook@test.ir", "pw").await;

        let (_, tag) =
            post_json(&app, &cookie, "/api/recipe/tags", json!({ "name": "Drop" })).await;
        let (_, created) = post_json(
            &app,
            &cookie,
            "/api/recipe/recipes",
            json!({ "title": "Old", "timeMinutes": 30, "price": "5.25", "tags": [tag["id"]] }),
        )
        .await;
        let id = created["id"].as_i64().expect("id");

        let upload = multipart_request(
            &format!("/api/recipe/recipes/{id}/upload-image"),
            &cookie,
            &png_bytes(),
        );
        let response = actix_test::call_service(&app, upload).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/recipe/recipes/{id}"))
                .cookie(cookie)
                .set_json(recipe_body("Rewritten"))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("json");
        assert_eq!(value["title"], "Rewritten");
        assert_eq!(value["tags"], json!([]));
        let image = value["image"].as_str().expect("image kept");
        assert!(image.starts_with("recipes/recipe-"));
        assert!(image.ends_with(".png"));
    }

    #[actix_web::test]
    async fn upload_rejects_payloads_that_do_not_decode() {
        let (state, _media) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_login(&app, "cook@test.ir", "pw").await;

        let (_, created) =
            post_json(&app, &cookie, "/api/recipe/recipes", recipe_body("Pie")).await;
        let uri = format!("/api/recipe/recipes/{}/upload-image", created["id"]);

        let request = multipart_request(&uri, &cookie, b"plainly not an image");
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("json");
        assert_eq!(value["details"]["field"], "image");
        assert_eq!(value["details"]["code"], "invalid_image");
    }

    #[actix_web::test]
    async fn upload_to_a_missing_recipe_is_not_found() {
        let (state, _media) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_login(&app, "cook@test.ir", "pw").await;

        let response = actix_test::call_service(
            &app,
            multipart_request("/api/recipe/recipes/999/upload-image", &cookie, &png_bytes()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

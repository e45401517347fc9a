//! Ingredient API handlers; same contract as tags.

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Ingredient};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{assigned_only_flag, required_text, FieldName};
use crate::inbound::http::ApiResult;

const NAME: FieldName = FieldName::new("name");

/// Ingredient representation returned to clients.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientBody {
    /// Stable identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
}

impl From<Ingredient> for IngredientBody {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id.0,
            name: ingredient.name,
        }
    }
}

/// Creation body for `POST /api/recipe/ingredients`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngredientRequest {
    /// Display name; must not be blank.
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    assigned_only: Option<String>,
}

/// List the caller's ingredients, newest name first.
#[utoipa::path(
    get,
    path = "/api/recipe/ingredients",
    params(
        ("assigned_only" = Option<String>, Query, description = "When 1 or true, only ingredients assigned to at least one recipe")
    ),
    responses(
        (status = 200, description = "Ingredients owned by the caller", body = [IngredientBody]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipe"],
    operation_id = "listIngredients"
)]
#[get("/ingredients")]
pub async fn list_ingredients(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Vec<IngredientBody>>> {
    let owner = session.require_user_id()?;
    let assigned_only = assigned_only_flag(query.assigned_only.as_deref());
    let rows = state
        .ingredients
        .list(owner, assigned_only)
        .await
        .map_err(|err| Error::internal(err.to_string()))?;
    Ok(web::Json(
        rows.into_iter().map(IngredientBody::from).collect(),
    ))
}

/// Create an ingredient owned by the caller.
#[utoipa::path(
    post,
    path = "/api/recipe/ingredients",
    request_body = CreateIngredientRequest,
    responses(
        (status = 201, description = "Ingredient created", body = IngredientBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipe"],
    operation_id = "createIngredient"
)]
#[post("/ingredients")]
pub async fn create_ingredient(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateIngredientRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let name = required_text(payload.into_inner().name, NAME)?;
    let ingredient = state
        .ingredients
        .create(owner, &name)
        .await
        .map_err(|err| Error::internal(err.to_string()))?;
    Ok(HttpResponse::Created().json(IngredientBody::from(ingredient)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, web, App};
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
                            .service(list_ingredients)
                            .service(create_ingredient),
                    ),
            )
    }

    #[actix_web::test]
    async fn creation_requires_a_session() {
        let (state, _media) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/recipe/ingredients")
                .set_json(json!({ "name": "Salt" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn ingredients_are_scoped_and_ordered() {
        let (state, _media) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let alice = register_and_login(&app, "alice@test.ir", "pw").await;
        let bob = register_and_login(&app, "bob@test.ir", "pw").await;

        for name in ["Kale", "Salt"] {
            let response = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/recipe/ingredients")
                    .cookie(alice.clone())
                    .set_json(json!({ "name": name }))
                    .to_request(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/recipe/ingredients")
                .cookie(bob)
                .set_json(json!({ "name": "Vinegar" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/recipe/ingredients")
                .cookie(alice)
                .to_request(),
        )
        .await;
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("json");
        let names: Vec<&str> = value
            .as_array()
            .expect("array")
            .iter()
            .map(|row| row["name"].as_str().expect("name"))
            .collect();
        assert_eq!(names, ["Salt", "Kale"]);
    }

    #[actix_web::test]
    async fn missing_name_is_rejected() {
        let (state, _media) = memory_state();
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_login(&app, "cook@test.ir", "pw").await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/recipe/ingredients")
                .cookie(cookie)
                .set_json(json!({}))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("json");
        assert_eq!(value["details"]["field"], "name");
        assert_eq!(value["details"]["code"], "required");
    }
}

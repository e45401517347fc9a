//! End-to-end exercise of the recipe API over in-memory adapters:
//! registration through image upload, including owner isolation and
//! the summary/detail projection split.

use std::io::Cursor;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use larder::inbound::http::{ingredients, recipes, tags, users};
use larder::test_support::{memory_state, register_and_login, test_session_middleware};

fn full_app(
    state: web::Data<larder::inbound::http::state::HttpState>,
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
                        .service(users::login)
                        .service(users::me)
                        .service(users::register),
                )
                .service(
                    web::scope("/recipe")
                        .service(tags::list_tags)
                        .service(tags::create_tag)
                        .service(ingredients::list_ingredients)
                        .service(ingredients::create_ingredient)
                        .service(recipes::list_recipes)
                        .service(recipes::create_recipe)
                        .service(recipes::get_recipe)
                        .service(recipes::replace_recipe)
                        .service(recipes::patch_recipe)
                        .service(recipes::upload_image),
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
    let response = test::call_service(
        app,
        test::TestRequest::post()
            .uri(uri)
            .cookie(cookie.clone())
            .set_json(body)
            .to_request(),
    )
    .await;
    let status = response.status();
    let value = serde_json::from_slice(&test::read_body(response).await).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    cookie: &actix_web::cookie::Cookie<'static>,
    uri: &str,
) -> (StatusCode, Value) {
    let response = test::call_service(
        app,
        test::TestRequest::get()
            .uri(uri)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let status = response.status();
    let value = serde_json::from_slice(&test::read_body(response).await).unwrap_or(Value::Null);
    (status, value)
}

fn png_bytes() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(2, 2)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .expect("encode png");
    buffer.into_inner()
}

#[actix_web::test]
async fn full_recipe_workflow() {
    let (state, _media) = memory_state();
    let app = test::init_service(full_app(state)).await;

    let alice = register_and_login(&app, "Alice@Example.COM", "pw12345").await;
    let bob = register_and_login(&app, "bob@example.com", "pw12345").await;

    // Normalized identity.
    let (status, me) = get_json(&app, &alice, "/api/user/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "alice@example.com");

    // Catalog setup.
    let (_, dessert) =
        post_json(&app, &alice, "/api/recipe/tags", json!({ "name": "Dessert" })).await;
    let (_, sugar) = post_json(
        &app,
        &alice,
        "/api/recipe/ingredients",
        json!({ "name": "Sugar" }),
    )
    .await;

    let (status, cake) = post_json(
        &app,
        &alice,
        "/api/recipe/recipes",
        json!({
            "title": "Cake",
            "timeMinutes": 90,
            "price": "21.00",
            "tags": [dessert["id"]],
            "ingredients": [sugar["id"]],
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cake["tags"][0]["name"], "Dessert");
    assert_eq!(cake["ingredients"][0]["name"], "Sugar");

    let (status, toast) = post_json(
        &app,
        &alice,
        "/api/recipe/recipes",
        json!({ "title": "Toast", "timeMinutes": 5, "price": "1.50" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // List: newest first, summary projection with association ids.
    let (_, listed) = get_json(&app, &alice, "/api/recipe/recipes").await;
    let rows = listed.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], toast["id"]);
    assert_eq!(rows[1]["tags"][0], dessert["id"]);

    // OR-filter on tags.
    let uri = format!("/api/recipe/recipes?tags={}", dessert["id"]);
    let (_, filtered) = get_json(&app, &alice, &uri).await;
    let rows = filtered.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Cake");

    // Owner isolation: Bob sees nothing and cannot fetch Alice's rows.
    let (_, bob_list) = get_json(&app, &bob, "/api/recipe/recipes").await;
    assert_eq!(bob_list.as_array().map(Vec::len), Some(0));
    let uri = format!("/api/recipe/recipes/{}", cake["id"]);
    let (status, _) = get_json(&app, &bob, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Image upload, then a merge patch leaves the image in place.
    let boundary = "larder-workflow-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; \
             filename=\"cake.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(&png_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    let upload = test::TestRequest::post()
        .uri(&format!("/api/recipe/recipes/{}/upload-image", cake["id"]))
        .cookie(alice.clone())
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(body)
        .to_request();
    let response = test::call_service(&app, upload).await;
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded: Value =
        serde_json::from_slice(&test::read_body(response).await).expect("json");
    let image = uploaded["image"].as_str().expect("image reference");
    assert!(image.starts_with("recipes/"));

    let response = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/recipe/recipes/{}", cake["id"]))
            .cookie(alice.clone())
            .set_json(json!({ "price": "23.50" }))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let patched: Value = serde_json::from_slice(&test::read_body(response).await).expect("json");
    assert_eq!(patched["price"], "23.50");
    assert_eq!(patched["image"], image);
    assert_eq!(patched["title"], "Cake");

    // Assigned-only filters stay owner-scoped.
    let (_, assigned) = get_json(&app, &alice, "/api/recipe/ingredients?assigned_only=1").await;
    let rows = assigned.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Sugar");
    let (_, bob_assigned) = get_json(&app, &bob, "/api/recipe/tags?assigned_only=1").await;
    assert_eq!(bob_assigned.as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn unauthenticated_requests_are_rejected_before_validation() {
    let (state, _media) = memory_state();
    let app = test::init_service(full_app(state)).await;

    for uri in [
        "/api/recipe/tags",
        "/api/recipe/ingredients",
        "/api/recipe/recipes",
    ] {
        let response =
            test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "GET {uri}");
    }

    // Even an invalid body gets 401 first.
    let response = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/recipe/recipes")
            .set_json(json!({}))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

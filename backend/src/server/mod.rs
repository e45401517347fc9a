//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::{
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
    SessionMiddleware,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
use tracing::warn;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::Argon2PasswordHasher;
use crate::domain::AccountService;
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ingredients, recipes, tags, users};
use crate::outbound::media::FsImageStore;
use crate::outbound::persistence::{
    DieselIngredientRepository, DieselRecipeRepository, DieselTagRepository, DieselUserRepository,
    MemoryPersistence,
};

/// Build the handler state: database-backed adapters when a pool is
/// configured, otherwise the in-memory fallback for local development.
fn build_http_state(config: &ServerConfig) -> HttpState {
    let images = Arc::new(FsImageStore::new(config.media_root.clone()));
    match &config.db_pool {
        Some(pool) => {
            let users = Arc::new(DieselUserRepository::new(pool.clone()));
            HttpState {
                accounts: AccountService::new(users.clone(), Arc::new(Argon2PasswordHasher)),
                users,
                tags: Arc::new(DieselTagRepository::new(pool.clone())),
                ingredients: Arc::new(DieselIngredientRepository::new(pool.clone())),
                recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
                images,
            }
        }
        None => {
            warn!("no database configured; using in-memory persistence");
            let store = MemoryPersistence::new();
            let users = Arc::new(store.clone());
            HttpState {
                accounts: AccountService::new(users.clone(), Arc::new(Argon2PasswordHasher)),
                users,
                tags: Arc::new(store.clone()),
                ingredients: Arc::new(store.clone()),
                recipes: Arc::new(store),
                images,
            }
        }
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api")
        .wrap(session)
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
        );

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config));
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        media_root: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

//! Helpers for exercising the HTTP adapter against in-memory
//! adapters. Compiled for unit tests and behind the `test-support`
//! feature for integration tests.

use std::sync::Arc;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Cookie, Key};
use actix_web::{body::MessageBody, dev, test, web};
use serde_json::json;
use tempfile::TempDir;

use crate::domain::ports::Argon2PasswordHasher;
use crate::domain::AccountService;
use crate::inbound::http::state::HttpState;
use crate::outbound::media::FsImageStore;
use crate::outbound::persistence::MemoryPersistence;

/// Session middleware configured for tests: fresh key per invocation,
/// cookie named `session`, `Secure` off for plain-HTTP test calls.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state backed entirely by in-memory adapters. The returned
/// [`TempDir`] owns the media root and must outlive the state.
pub fn memory_state() -> (web::Data<HttpState>, TempDir) {
    let media_root = TempDir::new().unwrap_or_else(|err| panic!("media tempdir: {err}"));
    let store = MemoryPersistence::new();
    let users = Arc::new(store.clone());
    let state = HttpState {
        accounts: AccountService::new(users.clone(), Arc::new(Argon2PasswordHasher)),
        users,
        tags: Arc::new(store.clone()),
        ingredients: Arc::new(store.clone()),
        recipes: Arc::new(store),
        images: Arc::new(FsImageStore::new(media_root.path())),
    };
    (web::Data::new(state), media_root)
}

/// Register an account and log in over the wire, returning the session
/// cookie for subsequent authenticated requests.
pub async fn register_and_login<S, B>(app: &S, email: &str, password: &str) -> Cookie<'static>
where
    S: dev::Service<
        actix_http::Request,
        Response = dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: MessageBody,
{
    let register = test::TestRequest::post()
        .uri("/api/user")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let response = test::call_service(app, register).await;
    assert!(
        response.status().is_success(),
        "registration failed: {}",
        response.status()
    );

    let login = test::TestRequest::post()
        .uri("/api/user/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let response = test::call_service(app, login).await;
    assert!(
        response.status().is_success(),
        "login failed: {}",
        response.status()
    );
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .unwrap_or_else(|| panic!("session cookie missing"))
        .into_owned()
}

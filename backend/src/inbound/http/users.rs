//! User API handlers: registration, login, and the current-user view.
//!
//! ```text
//! POST /api/user {"email":"cook@example.com","password":"secret"}
//! POST /api/user/login {"email":"cook@example.com","password":"secret"}
//! GET  /api/user/me
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, User};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{required_text, FieldName};
use crate::inbound::http::ApiResult;

const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");

/// Credentials body shared by registration and login.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    /// Account email address.
    pub email: Option<String>,
    /// Plaintext password; hashed before storage and never echoed.
    pub password: Option<String>,
}

/// User representation returned to clients. The password hash never
/// leaves the service.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    /// Stable identifier.
    pub id: String,
    /// Normalized email address.
    pub email: String,
    /// Whether the account can authenticate.
    pub is_active: bool,
    /// Administrative-surface access flag.
    pub is_staff: bool,
    /// All-permissions flag.
    pub is_superuser: bool,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_ref().to_owned(),
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        }
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/user",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = UserBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["user"],
    operation_id = "register",
    security([])
)]
#[post("")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = required_text(payload.email, EMAIL)?;
    let password = required_text(payload.password, PASSWORD)?;
    let user = state.accounts.create_user(&email, &password).await?;
    Ok(HttpResponse::Created().json(UserBody::from(user)))
}

/// Verify credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["user"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = required_text(payload.email, EMAIL)?;
    let password = required_text(payload.password, PASSWORD)?;
    let user = state.accounts.authenticate(&email, &password).await?;
    session.persist_user(user.id)?;
    Ok(HttpResponse::Ok().json(UserBody::from(user)))
}

/// Return the authenticated user.
#[utoipa::path(
    get,
    path = "/api/user/me",
    responses(
        (status = 200, description = "Current user", body = UserBody),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["user"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserBody>> {
    let user_id = session.require_user_id()?;
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(|err| Error::internal(err.to_string()))?
        .ok_or_else(|| Error::unauthorized("login required"))?;
    Ok(web::Json(UserBody::from(user)))
}

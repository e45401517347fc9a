//! Tag API handlers.
//!
//! ```text
//! GET  /api/recipe/tags?assigned_only=1
//! POST /api/recipe/tags {"name":"Dessert"}
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Tag};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{assigned_only_flag, required_text, FieldName};
use crate::inbound::http::ApiResult;

const NAME: FieldName = FieldName::new("name");

/// Tag representation returned to clients.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagBody {
    /// Stable identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
}

impl From<Tag> for TagBody {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id.0,
            name: tag.name,
        }
    }
}

/// Creation body for `POST /api/recipe/tags`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagRequest {
    /// Display name; must not be blank.
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    assigned_only: Option<String>,
}

/// List the caller's tags, newest name first.
#[utoipa::path(
    get,
    path = "/api/recipe/tags",
    params(
        ("assigned_only" = Option<String>, Query, description = "When 1 or true, only tags assigned to at least one recipe")
    ),
    responses(
        (status = 200, description = "Tags owned by the caller", body = [TagBody]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipe"],
    operation_id = "listTags"
)]
#[get("/tags")]
pub async fn list_tags(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Vec<TagBody>>> {
    let owner = session.require_user_id()?;
    let assigned_only = assigned_only_flag(query.assigned_only.as_deref());
    let rows = state
        .tags
        .list(owner, assigned_only)
        .await
        .map_err(|err| Error::internal(err.to_string()))?;
    Ok(web::Json(rows.into_iter().map(TagBody::from).collect()))
}

/// Create a tag owned by the caller.
#[utoipa::path(
    post,
    path = "/api/recipe/tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = TagBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipe"],
    operation_id = "createTag"
)]
#[post("/tags")]
pub async fn create_tag(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTagRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let name = required_text(payload.into_inner().name, NAME)?;
    let tag = state
        .tags
        .create(owner, &name)
        .await
        .map_err(|err| Error::internal(err.to_string()))?;
    Ok(HttpResponse::Created().json(TagBody::from(tag)))
}

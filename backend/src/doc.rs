//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct that generates the OpenAPI
//! specification for the REST API: every HTTP endpoint, the request
//! and response schemas, and the session cookie security scheme. The
//! generated document backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::ingredients::{CreateIngredientRequest, IngredientBody};
use crate::inbound::http::recipes::{
    RecipeDetailBody, RecipePatchRequest, RecipeSummaryBody, RecipeWriteRequest,
};
use crate::inbound::http::tags::{CreateTagRequest, TagBody};
use crate::inbound::http::users::{CredentialsRequest, UserBody};

/// Enrich the generated document with the session cookie security
/// scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/user/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Larder API",
        description = "Recipe-box backend: owner-scoped tags, ingredients, and recipes behind session authentication.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::me,
        crate::inbound::http::tags::list_tags,
        crate::inbound::http::tags::create_tag,
        crate::inbound::http::ingredients::list_ingredients,
        crate::inbound::http::ingredients::create_ingredient,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::replace_recipe,
        crate::inbound::http::recipes::patch_recipe,
        crate::inbound::http::recipes::upload_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CredentialsRequest,
        UserBody,
        TagBody,
        CreateTagRequest,
        IngredientBody,
        CreateIngredientRequest,
        RecipeSummaryBody,
        RecipeDetailBody,
        RecipeWriteRequest,
        RecipePatchRequest,
    )),
    tags(
        (name = "user", description = "Registration, login, and the current user"),
        (name = "recipe", description = "Owner-scoped tags, ingredients, and recipes"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports and remain testable without
//! I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ImageStore, IngredientRepository, RecipeRepository, TagRepository, UserRepository,
};
use crate::domain::AccountService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration, login, and privileged account creation.
    pub accounts: AccountService,
    /// User lookup for the current-user endpoint.
    pub users: Arc<dyn UserRepository>,
    /// Tag listing and creation.
    pub tags: Arc<dyn TagRepository>,
    /// Ingredient listing and creation.
    pub ingredients: Arc<dyn IngredientRepository>,
    /// Recipe CRUD and association management.
    pub recipes: Arc<dyn RecipeRepository>,
    /// Validated image persistence.
    pub images: Arc<dyn ImageStore>,
}

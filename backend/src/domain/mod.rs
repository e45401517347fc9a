//! Domain entities, invariants, and services.
//!
//! Types here are transport and storage agnostic. Inbound adapters map
//! them to HTTP payloads; outbound adapters persist them. Ownership is
//! always explicit: every repository call in [`ports`] takes the owning
//! [`UserId`] as a parameter rather than relying on ambient scoping.

pub mod accounts;
pub mod catalog;
pub mod email;
pub mod error;
pub mod ports;
pub mod user;

pub use self::accounts::AccountService;
pub use self::catalog::{
    Ingredient, IngredientId, Recipe, RecipeDetail, RecipeDraft, RecipeFilter, RecipeId,
    RecipePatch, Tag, TagId,
};
pub use self::email::{EmailAddress, EmailValidationError};
pub use self::error::{Error, ErrorCode};
pub use self::user::{User, UserId};

/// Convenient result alias for domain operations.
pub type ApiResult<T> = Result<T, Error>;

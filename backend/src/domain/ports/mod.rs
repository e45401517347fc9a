//! Domain ports for the hexagonal boundary.
//!
//! Adapters (persistence, media storage, password hashing) implement
//! these traits; domain services and HTTP handlers depend only on the
//! trait objects. Repository methods take the owning
//! [`crate::domain::UserId`] explicitly so ownership scoping can never
//! be forgotten at a call site.

mod macros;
pub(crate) use macros::define_port_error;

mod image_store;
mod ingredient_repository;
mod password_hasher;
mod recipe_repository;
mod tag_repository;
mod user_repository;

pub use image_store::{ImageStore, ImageStoreError};
pub use ingredient_repository::{IngredientPersistenceError, IngredientRepository};
pub use password_hasher::{Argon2PasswordHasher, PasswordHashError, PasswordHasher};
pub use recipe_repository::{RecipePersistenceError, RecipeRepository};
pub use tag_repository::{TagPersistenceError, TagRepository};
pub use user_repository::{UserPersistenceError, UserRepository};

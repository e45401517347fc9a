//! PostgreSQL persistence adapters (Diesel) plus the in-memory
//! fallback used when no database is configured.

mod diesel_ingredient_repository;
mod diesel_recipe_repository;
mod diesel_tag_repository;
mod diesel_user_repository;
mod error_map;
mod memory;
mod models;
mod pool;
pub mod schema;

pub use diesel_ingredient_repository::DieselIngredientRepository;
pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_tag_repository::DieselTagRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use memory::MemoryPersistence;
pub use pool::{DbPool, PoolConfig, PoolError};

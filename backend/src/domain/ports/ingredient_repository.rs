//! Port abstraction for ingredient persistence adapters.

use async_trait::async_trait;

use crate::domain::{Ingredient, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by ingredient repository adapters.
    pub enum IngredientPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "ingredient repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ingredient repository query failed: {message}",
    }
}

/// Storage boundary for ingredients, owner-scoped like
/// [`super::TagRepository`].
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// List the owner's ingredients ordered by name descending, with
    /// the same `assigned_only` de-duplication contract as tags.
    async fn list(
        &self,
        owner: UserId,
        assigned_only: bool,
    ) -> Result<Vec<Ingredient>, IngredientPersistenceError>;

    /// Persist a new ingredient for the owner and return it.
    async fn create(
        &self,
        owner: UserId,
        name: &str,
    ) -> Result<Ingredient, IngredientPersistenceError>;
}

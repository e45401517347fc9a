//! Port abstraction for recipe persistence adapters.

use async_trait::async_trait;

use crate::domain::{Recipe, RecipeDetail, RecipeDraft, RecipeFilter, RecipeId, RecipePatch, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by recipe repository adapters.
    pub enum RecipePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "recipe repository query failed: {message}",
        /// A supplied tag id does not resolve to any tag.
        UnknownTag { id: i64 } => "tag {id} does not exist",
        /// A supplied ingredient id does not resolve to any ingredient.
        UnknownIngredient { id: i64 } => "ingredient {id} does not exist",
    }
}

/// Storage boundary for recipes.
///
/// Association ids in drafts and patches are resolved globally, not
/// per owner: attaching another user's tag is permitted, matching the
/// observed behaviour of the system this replaces. Listing and lookup
/// remain strictly owner-scoped.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// List the owner's recipes, newest (highest id) first, applying
    /// the filter's OR-semantics id lists when non-empty. Returns the
    /// summary projection.
    async fn list(
        &self,
        owner: UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipePersistenceError>;

    /// Fetch one recipe as the full projection. `None` when the id is
    /// unknown or belongs to a different owner; the two cases are
    /// indistinguishable by design.
    async fn find(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError>;

    /// Persist a new recipe with its association sets.
    async fn create(
        &self,
        owner: UserId,
        draft: RecipeDraft,
    ) -> Result<RecipeDetail, RecipePersistenceError>;

    /// Fully replace a recipe: every draft field is written and the
    /// association sets become exactly the draft's id lists. The stored
    /// image is untouched. `None` when the recipe is not the owner's.
    async fn replace(
        &self,
        owner: UserId,
        id: RecipeId,
        draft: RecipeDraft,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError>;

    /// Merge-patch a recipe: only supplied fields change; a supplied
    /// id list replaces the full association set.
    async fn patch(
        &self,
        owner: UserId,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError>;

    /// Record the stored image reference for a recipe.
    async fn set_image(
        &self,
        owner: UserId,
        id: RecipeId,
        image: &str,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError>;
}

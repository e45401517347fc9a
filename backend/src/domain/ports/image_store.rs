//! Port abstraction for storing validated recipe images.

use async_trait::async_trait;

use crate::domain::RecipeId;

use super::define_port_error;

define_port_error! {
    /// Failures raised by image storage adapters.
    pub enum ImageStoreError {
        /// The backing store rejected the write.
        Io { message: String } => "image store failure: {message}",
    }
}

/// Storage boundary for already-validated image payloads.
///
/// Callers validate that the payload decodes as an image before
/// storing; adapters only persist bytes and hand back a stable
/// reference suitable for the `image` field of a recipe.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist image bytes for a recipe and return the stored
    /// reference. `extension` is the lower-case file extension of the
    /// detected format, e.g. `png`.
    async fn store_recipe_image(
        &self,
        recipe: RecipeId,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, ImageStoreError>;
}

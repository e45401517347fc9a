//! Filesystem-backed media storage.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::RecipeId;

/// Stores recipe images under a media root directory.
///
/// Files land in a `recipes/` subdirectory with a random component in
/// the filename so repeated uploads never collide. The returned
/// reference is the path relative to the media root, which is what the
/// API serves back to clients.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    /// Create a store rooted at `root`. The directory is created on
    /// first write, not here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn store_recipe_image(
        &self,
        recipe: RecipeId,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, ImageStoreError> {
        let dir = self.root.join("recipes");
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|err| ImageStoreError::io(err.to_string()))?;
        let file_name = format!("recipe-{recipe}-{}.{extension}", Uuid::new_v4());
        tokio::fs::write(dir.join(&file_name), bytes)
            .await
            .map_err(|err| ImageStoreError::io(err.to_string()))?;
        Ok(format!("recipes/{file_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_bytes_and_returns_relative_reference() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsImageStore::new(dir.path());

        let reference = store
            .store_recipe_image(RecipeId(7), "png", b"not-a-real-png")
            .await
            .expect("store");

        assert!(reference.starts_with("recipes/recipe-7-"));
        assert!(reference.ends_with(".png"));
        let written = std::fs::read(dir.path().join(&reference)).expect("read back");
        assert_eq!(written, b"not-a-real-png");
    }

    #[tokio::test]
    async fn repeated_uploads_get_distinct_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsImageStore::new(dir.path());

        let first = store
            .store_recipe_image(RecipeId(1), "jpg", b"a")
            .await
            .expect("store");
        let second = store
            .store_recipe_image(RecipeId(1), "jpg", b"b")
            .await
            .expect("store");

        assert_ne!(first, second);
    }
}

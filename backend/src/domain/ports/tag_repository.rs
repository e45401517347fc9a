//! Port abstraction for tag persistence adapters.

use async_trait::async_trait;

use crate::domain::{Tag, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by tag repository adapters.
    pub enum TagPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "tag repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "tag repository query failed: {message}",
    }
}

/// Storage boundary for tags. All reads and writes are scoped to the
/// owning user passed at each call.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// List the owner's tags ordered by name descending. With
    /// `assigned_only`, restrict to tags attached to at least one
    /// recipe; each tag appears at most once regardless of how many
    /// recipes it is attached to.
    async fn list(
        &self,
        owner: UserId,
        assigned_only: bool,
    ) -> Result<Vec<Tag>, TagPersistenceError>;

    /// Persist a new tag for the owner and return it.
    async fn create(&self, owner: UserId, name: &str) -> Result<Tag, TagPersistenceError>;
}

//! PostgreSQL-backed `TagRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{TagPersistenceError, TagRepository};
use crate::domain::{Tag, UserId};

use super::error_map::classify_diesel_error;
use super::models::{NewTagRow, TagRow};
use super::pool::{DbPool, PoolError};
use super::schema::{recipe_tags, tags};

/// Diesel-backed implementation of the `TagRepository` port.
#[derive(Clone)]
pub struct DieselTagRepository {
    pool: DbPool,
}

impl DieselTagRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TagPersistenceError {
    TagPersistenceError::connection(error.to_string())
}

fn map_diesel_error(error: diesel::result::Error) -> TagPersistenceError {
    classify_diesel_error(
        error,
        TagPersistenceError::connection,
        TagPersistenceError::query,
    )
}

#[async_trait]
impl TagRepository for DieselTagRepository {
    async fn list(
        &self,
        owner: UserId,
        assigned_only: bool,
    ) -> Result<Vec<Tag>, TagPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = tags::table
            .filter(tags::user_id.eq(owner.as_uuid()))
            .into_boxed();
        if assigned_only {
            // Membership subquery de-duplicates without a join.
            query = query.filter(tags::id.eq_any(recipe_tags::table.select(recipe_tags::tag_id)));
        }
        let rows: Vec<TagRow> = query
            .order(tags::name.desc())
            .select(TagRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn create(&self, owner: UserId, name: &str) -> Result<Tag, TagPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: TagRow = diesel::insert_into(tags::table)
            .values(&NewTagRow {
                name,
                user_id: owner.as_uuid(),
            })
            .returning(TagRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Tag::from(row))
    }
}

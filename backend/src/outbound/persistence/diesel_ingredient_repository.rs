//! PostgreSQL-backed `IngredientRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{IngredientPersistenceError, IngredientRepository};
use crate::domain::{Ingredient, UserId};

use super::error_map::classify_diesel_error;
use super::models::{IngredientRow, NewIngredientRow};
use super::pool::{DbPool, PoolError};
use super::schema::{ingredients, recipe_ingredients};

/// Diesel-backed implementation of the `IngredientRepository` port.
#[derive(Clone)]
pub struct DieselIngredientRepository {
    pool: DbPool,
}

impl DieselIngredientRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> IngredientPersistenceError {
    IngredientPersistenceError::connection(error.to_string())
}

fn map_diesel_error(error: diesel::result::Error) -> IngredientPersistenceError {
    classify_diesel_error(
        error,
        IngredientPersistenceError::connection,
        IngredientPersistenceError::query,
    )
}

#[async_trait]
impl IngredientRepository for DieselIngredientRepository {
    async fn list(
        &self,
        owner: UserId,
        assigned_only: bool,
    ) -> Result<Vec<Ingredient>, IngredientPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = ingredients::table
            .filter(ingredients::user_id.eq(owner.as_uuid()))
            .into_boxed();
        if assigned_only {
            query = query.filter(
                ingredients::id
                    .eq_any(recipe_ingredients::table.select(recipe_ingredients::ingredient_id)),
            );
        }
        let rows: Vec<IngredientRow> = query
            .order(ingredients::name.desc())
            .select(IngredientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    async fn create(
        &self,
        owner: UserId,
        name: &str,
    ) -> Result<Ingredient, IngredientPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: IngredientRow = diesel::insert_into(ingredients::table)
            .values(&NewIngredientRow {
                name,
                user_id: owner.as_uuid(),
            })
            .returning(IngredientRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Ingredient::from(row))
    }
}

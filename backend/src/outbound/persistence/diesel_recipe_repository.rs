//! PostgreSQL-backed `RecipeRepository` implementation.
//!
//! Mutations that touch association sets run inside a transaction so a
//! rejected tag or ingredient id leaves the recipe untouched.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{RecipePersistenceError, RecipeRepository};
use crate::domain::{
    Ingredient, IngredientId, Recipe, RecipeDetail, RecipeDraft, RecipeFilter, RecipeId,
    RecipePatch, Tag, TagId, UserId,
};

use super::error_map::classify_diesel_error;
use super::models::{
    IngredientRow, NewRecipeRow, RecipeIngredientRow, RecipeRow, RecipeTagRow, TagRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags};

/// Diesel-backed implementation of the `RecipeRepository` port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipePersistenceError {
    RecipePersistenceError::connection(error.to_string())
}

impl From<diesel::result::Error> for RecipePersistenceError {
    fn from(error: diesel::result::Error) -> Self {
        classify_diesel_error(error, Self::connection, Self::query)
    }
}

/// Reject drafts referencing tags or ingredients that do not exist
/// anywhere. Existence is global on purpose: cross-owner association
/// is permitted.
async fn verify_associations(
    conn: &mut AsyncPgConnection,
    tag_ids: &[TagId],
    ingredient_ids: &[IngredientId],
) -> Result<(), RecipePersistenceError> {
    if !tag_ids.is_empty() {
        let wanted: Vec<i64> = tag_ids.iter().map(|id| id.0).collect();
        let found: Vec<i64> = tags::table
            .filter(tags::id.eq_any(&wanted))
            .select(tags::id)
            .load(conn)
            .await?;
        if let Some(missing) = wanted.iter().find(|id| !found.contains(id)) {
            return Err(RecipePersistenceError::unknown_tag(*missing));
        }
    }
    if !ingredient_ids.is_empty() {
        let wanted: Vec<i64> = ingredient_ids.iter().map(|id| id.0).collect();
        let found: Vec<i64> = ingredients::table
            .filter(ingredients::id.eq_any(&wanted))
            .select(ingredients::id)
            .load(conn)
            .await?;
        if let Some(missing) = wanted.iter().find(|id| !found.contains(id)) {
            return Err(RecipePersistenceError::unknown_ingredient(*missing));
        }
    }
    Ok(())
}

/// Replace the association rows of one recipe with the given id sets.
async fn write_associations(
    conn: &mut AsyncPgConnection,
    recipe_id: i64,
    tag_ids: &[TagId],
    ingredient_ids: &[IngredientId],
) -> Result<(), RecipePersistenceError> {
    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
        .execute(conn)
        .await?;
    diesel::delete(
        recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
    )
    .execute(conn)
    .await?;

    let tag_rows: Vec<RecipeTagRow> = tag_ids
        .iter()
        .map(|tag| RecipeTagRow {
            recipe_id,
            tag_id: tag.0,
        })
        .collect();
    if !tag_rows.is_empty() {
        diesel::insert_into(recipe_tags::table)
            .values(&tag_rows)
            .execute(conn)
            .await?;
    }
    let ingredient_rows: Vec<RecipeIngredientRow> = ingredient_ids
        .iter()
        .map(|ingredient| RecipeIngredientRow {
            recipe_id,
            ingredient_id: ingredient.0,
        })
        .collect();
    if !ingredient_rows.is_empty() {
        diesel::insert_into(recipe_ingredients::table)
            .values(&ingredient_rows)
            .execute(conn)
            .await?;
    }
    Ok(())
}

/// Load the full projection for one already-fetched recipe row.
async fn load_detail(
    conn: &mut AsyncPgConnection,
    row: RecipeRow,
) -> Result<RecipeDetail, RecipePersistenceError> {
    let tag_rows: Vec<TagRow> = tags::table
        .inner_join(recipe_tags::table)
        .filter(recipe_tags::recipe_id.eq(row.id))
        .order(tags::id.asc())
        .select(TagRow::as_select())
        .load(conn)
        .await?;
    let ingredient_rows: Vec<IngredientRow> = ingredients::table
        .inner_join(recipe_ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq(row.id))
        .order(ingredients::id.asc())
        .select(IngredientRow::as_select())
        .load(conn)
        .await?;
    Ok(row.into_detail(
        tag_rows.into_iter().map(Tag::from).collect(),
        ingredient_rows.into_iter().map(Ingredient::from).collect(),
    ))
}

/// Fetch one recipe row scoped to its owner.
async fn find_row(
    conn: &mut AsyncPgConnection,
    owner: UserId,
    id: RecipeId,
) -> Result<Option<RecipeRow>, RecipePersistenceError> {
    let row = recipes::table
        .filter(recipes::id.eq(id.0))
        .filter(recipes::user_id.eq(owner.as_uuid()))
        .select(RecipeRow::as_select())
        .first(conn)
        .await
        .optional()?;
    Ok(row)
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn list(
        &self,
        owner: UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = recipes::table
            .filter(recipes::user_id.eq(owner.as_uuid()))
            .into_boxed();
        if !filter.tag_ids.is_empty() {
            let wanted: Vec<i64> = filter.tag_ids.iter().map(|id| id.0).collect();
            query = query.filter(
                recipes::id.eq_any(
                    recipe_tags::table
                        .filter(recipe_tags::tag_id.eq_any(wanted))
                        .select(recipe_tags::recipe_id),
                ),
            );
        }
        if !filter.ingredient_ids.is_empty() {
            let wanted: Vec<i64> = filter.ingredient_ids.iter().map(|id| id.0).collect();
            query = query.filter(
                recipes::id.eq_any(
                    recipe_ingredients::table
                        .filter(recipe_ingredients::ingredient_id.eq_any(wanted))
                        .select(recipe_ingredients::recipe_id),
                ),
            );
        }
        let rows: Vec<RecipeRow> = query
            .order(recipes::id.desc())
            .select(RecipeRow::as_select())
            .load(&mut conn)
            .await?;

        let recipe_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let tag_pairs: Vec<(i64, i64)> = recipe_tags::table
            .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
            .order(recipe_tags::tag_id.asc())
            .select((recipe_tags::recipe_id, recipe_tags::tag_id))
            .load(&mut conn)
            .await?;
        let ingredient_pairs: Vec<(i64, i64)> = recipe_ingredients::table
            .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
            .order(recipe_ingredients::ingredient_id.asc())
            .select((
                recipe_ingredients::recipe_id,
                recipe_ingredients::ingredient_id,
            ))
            .load(&mut conn)
            .await?;

        let mut tags_by_recipe: HashMap<i64, Vec<TagId>> = HashMap::new();
        for (recipe_id, tag_id) in tag_pairs {
            tags_by_recipe.entry(recipe_id).or_default().push(TagId(tag_id));
        }
        let mut ingredients_by_recipe: HashMap<i64, Vec<IngredientId>> = HashMap::new();
        for (recipe_id, ingredient_id) in ingredient_pairs {
            ingredients_by_recipe
                .entry(recipe_id)
                .or_default()
                .push(IngredientId(ingredient_id));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let tag_ids = tags_by_recipe.remove(&row.id).unwrap_or_default();
                let ingredient_ids = ingredients_by_recipe.remove(&row.id).unwrap_or_default();
                row.into_summary(tag_ids, ingredient_ids)
            })
            .collect())
    }

    async fn find(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        match find_row(&mut conn, owner, id).await? {
            Some(row) => Ok(Some(load_detail(&mut conn, row).await?)),
            None => Ok(None),
        }
    }

    async fn create(
        &self,
        owner: UserId,
        draft: RecipeDraft,
    ) -> Result<RecipeDetail, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let conn = &mut *conn;
        conn.transaction::<RecipeDetail, RecipePersistenceError, _>(|conn| {
            async move {
                verify_associations(conn, &draft.tag_ids, &draft.ingredient_ids).await?;
                let row: RecipeRow = diesel::insert_into(recipes::table)
                    .values(&NewRecipeRow {
                        title: draft.title.as_str(),
                        time_minutes: draft.time_minutes,
                        price: draft.price,
                        user_id: owner.as_uuid(),
                        created_at: Utc::now(),
                    })
                    .returning(RecipeRow::as_returning())
                    .get_result(conn)
                    .await?;
                write_associations(conn, row.id, &draft.tag_ids, &draft.ingredient_ids).await?;
                load_detail(conn, row).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn replace(
        &self,
        owner: UserId,
        id: RecipeId,
        draft: RecipeDraft,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let conn = &mut *conn;
        conn.transaction::<Option<RecipeDetail>, RecipePersistenceError, _>(|conn| {
            async move {
                if find_row(conn, owner, id).await?.is_none() {
                    return Ok(None);
                }
                verify_associations(conn, &draft.tag_ids, &draft.ingredient_ids).await?;
                let row: RecipeRow = diesel::update(
                    recipes::table
                        .filter(recipes::id.eq(id.0))
                        .filter(recipes::user_id.eq(owner.as_uuid())),
                )
                .set((
                    recipes::title.eq(draft.title.as_str()),
                    recipes::time_minutes.eq(draft.time_minutes),
                    recipes::price.eq(draft.price),
                ))
                .returning(RecipeRow::as_returning())
                .get_result(conn)
                .await?;
                write_associations(conn, row.id, &draft.tag_ids, &draft.ingredient_ids).await?;
                load_detail(conn, row).await.map(Some)
            }
            .scope_boxed()
        })
        .await
    }

    async fn patch(
        &self,
        owner: UserId,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let conn = &mut *conn;
        conn.transaction::<Option<RecipeDetail>, RecipePersistenceError, _>(|conn| {
            async move {
                let Some(current) = find_row(conn, owner, id).await? else {
                    return Ok(None);
                };
                verify_associations(
                    conn,
                    patch.tag_ids.as_deref().unwrap_or_default(),
                    patch.ingredient_ids.as_deref().unwrap_or_default(),
                )
                .await?;
                let title = patch.title.unwrap_or(current.title);
                let time_minutes = patch.time_minutes.unwrap_or(current.time_minutes);
                let price = patch.price.unwrap_or(current.price);
                let row: RecipeRow = diesel::update(
                    recipes::table
                        .filter(recipes::id.eq(id.0))
                        .filter(recipes::user_id.eq(owner.as_uuid())),
                )
                .set((
                    recipes::title.eq(title),
                    recipes::time_minutes.eq(time_minutes),
                    recipes::price.eq(price),
                ))
                .returning(RecipeRow::as_returning())
                .get_result(conn)
                .await?;
                if let Some(tag_ids) = &patch.tag_ids {
                    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(row.id)))
                        .execute(conn)
                        .await?;
                    let tag_rows: Vec<RecipeTagRow> = tag_ids
                        .iter()
                        .map(|tag| RecipeTagRow {
                            recipe_id: row.id,
                            tag_id: tag.0,
                        })
                        .collect();
                    if !tag_rows.is_empty() {
                        diesel::insert_into(recipe_tags::table)
                            .values(&tag_rows)
                            .execute(conn)
                            .await?;
                    }
                }
                if let Some(ingredient_ids) = &patch.ingredient_ids {
                    diesel::delete(
                        recipe_ingredients::table
                            .filter(recipe_ingredients::recipe_id.eq(row.id)),
                    )
                    .execute(conn)
                    .await?;
                    let ingredient_rows: Vec<RecipeIngredientRow> = ingredient_ids
                        .iter()
                        .map(|ingredient| RecipeIngredientRow {
                            recipe_id: row.id,
                            ingredient_id: ingredient.0,
                        })
                        .collect();
                    if !ingredient_rows.is_empty() {
                        diesel::insert_into(recipe_ingredients::table)
                            .values(&ingredient_rows)
                            .execute(conn)
                            .await?;
                    }
                }
                load_detail(conn, row).await.map(Some)
            }
            .scope_boxed()
        })
        .await
    }

    async fn set_image(
        &self,
        owner: UserId,
        id: RecipeId,
        image: &str,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RecipeRow> = diesel::update(
            recipes::table
                .filter(recipes::id.eq(id.0))
                .filter(recipes::user_id.eq(owner.as_uuid())),
        )
        .set(recipes::image.eq(image))
        .returning(RecipeRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?;
        match row {
            Some(row) => Ok(Some(load_detail(&mut conn, row).await?)),
            None => Ok(None),
        }
    }
}

//! Stateful in-memory persistence, used when no database is
//! configured and by handler tests.
//!
//! Implements every repository port over one shared store so the
//! association checks behave like the SQL adapters: tag and ingredient
//! ids resolve globally while listing stays owner-scoped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    IngredientPersistenceError, IngredientRepository, RecipePersistenceError, RecipeRepository,
    TagPersistenceError, TagRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{
    EmailAddress, Ingredient, IngredientId, Recipe, RecipeDetail, RecipeDraft, RecipeFilter,
    RecipeId, RecipePatch, Tag, TagId, User, UserId,
};

#[derive(Debug, Clone)]
struct RecipeRecord {
    id: RecipeId,
    title: String,
    time_minutes: i32,
    price: rust_decimal::Decimal,
    image: Option<String>,
    owner: UserId,
    tag_ids: Vec<TagId>,
    ingredient_ids: Vec<IngredientId>,
}

#[derive(Debug, Default)]
struct StoreInner {
    users: Vec<User>,
    tags: Vec<Tag>,
    ingredients: Vec<Ingredient>,
    recipes: Vec<RecipeRecord>,
    next_tag_id: i64,
    next_ingredient_id: i64,
    next_recipe_id: i64,
}

/// In-memory implementation of all repository ports.
#[derive(Debug, Default, Clone)]
pub struct MemoryPersistence {
    inner: Arc<Mutex<StoreInner>>,
}

impl MemoryPersistence {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // A poisoned lock only means a panicking test; the data is
        // still structurally sound.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn detail_of(inner: &StoreInner, record: &RecipeRecord) -> RecipeDetail {
    let tags = record
        .tag_ids
        .iter()
        .filter_map(|id| inner.tags.iter().find(|tag| tag.id == *id).cloned())
        .collect();
    let ingredients = record
        .ingredient_ids
        .iter()
        .filter_map(|id| {
            inner
                .ingredients
                .iter()
                .find(|ingredient| ingredient.id == *id)
                .cloned()
        })
        .collect();
    RecipeDetail {
        id: record.id,
        title: record.title.clone(),
        time_minutes: record.time_minutes,
        price: record.price,
        image: record.image.clone(),
        owner: record.owner,
        tags,
        ingredients,
    }
}

fn verify_associations(
    inner: &StoreInner,
    tag_ids: &[TagId],
    ingredient_ids: &[IngredientId],
) -> Result<(), RecipePersistenceError> {
    if let Some(missing) = tag_ids
        .iter()
        .find(|id| !inner.tags.iter().any(|tag| tag.id == **id))
    {
        return Err(RecipePersistenceError::unknown_tag(missing.0));
    }
    if let Some(missing) = ingredient_ids
        .iter()
        .find(|id| !inner.ingredients.iter().any(|ingredient| ingredient.id == **id))
    {
        return Err(RecipePersistenceError::unknown_ingredient(missing.0));
    }
    Ok(())
}

#[async_trait]
impl UserRepository for MemoryPersistence {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut inner = self.lock();
        if inner.users.iter().any(|row| row.email == user.email) {
            return Err(UserPersistenceError::email_taken(user.email.as_ref()));
        }
        inner.users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().users.iter().find(|row| row.id == id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|row| row.email == *email)
            .cloned())
    }
}

#[async_trait]
impl TagRepository for MemoryPersistence {
    async fn list(
        &self,
        owner: UserId,
        assigned_only: bool,
    ) -> Result<Vec<Tag>, TagPersistenceError> {
        let inner = self.lock();
        let mut rows: Vec<Tag> = inner
            .tags
            .iter()
            .filter(|tag| tag.owner == owner)
            .filter(|tag| {
                !assigned_only
                    || inner
                        .recipes
                        .iter()
                        .any(|recipe| recipe.tag_ids.contains(&tag.id))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(rows)
    }

    async fn create(&self, owner: UserId, name: &str) -> Result<Tag, TagPersistenceError> {
        let mut inner = self.lock();
        inner.next_tag_id += 1;
        let tag = Tag {
            id: TagId(inner.next_tag_id),
            name: name.to_owned(),
            owner,
        };
        inner.tags.push(tag.clone());
        Ok(tag)
    }
}

#[async_trait]
impl IngredientRepository for MemoryPersistence {
    async fn list(
        &self,
        owner: UserId,
        assigned_only: bool,
    ) -> Result<Vec<Ingredient>, IngredientPersistenceError> {
        let inner = self.lock();
        let mut rows: Vec<Ingredient> = inner
            .ingredients
            .iter()
            .filter(|ingredient| ingredient.owner == owner)
            .filter(|ingredient| {
                !assigned_only
                    || inner
                        .recipes
                        .iter()
                        .any(|recipe| recipe.ingredient_ids.contains(&ingredient.id))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(rows)
    }

    async fn create(
        &self,
        owner: UserId,
        name: &str,
    ) -> Result<Ingredient, IngredientPersistenceError> {
        let mut inner = self.lock();
        inner.next_ingredient_id += 1;
        let ingredient = Ingredient {
            id: IngredientId(inner.next_ingredient_id),
            name: name.to_owned(),
            owner,
        };
        inner.ingredients.push(ingredient.clone());
        Ok(ingredient)
    }
}

#[async_trait]
impl RecipeRepository for MemoryPersistence {
    async fn list(
        &self,
        owner: UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipePersistenceError> {
        let inner = self.lock();
        let mut rows: Vec<Recipe> = inner
            .recipes
            .iter()
            .filter(|recipe| recipe.owner == owner)
            .filter(|recipe| {
                filter.tag_ids.is_empty()
                    || recipe.tag_ids.iter().any(|id| filter.tag_ids.contains(id))
            })
            .filter(|recipe| {
                filter.ingredient_ids.is_empty()
                    || recipe
                        .ingredient_ids
                        .iter()
                        .any(|id| filter.ingredient_ids.contains(id))
            })
            .map(|recipe| Recipe {
                id: recipe.id,
                title: recipe.title.clone(),
                time_minutes: recipe.time_minutes,
                price: recipe.price,
                image: recipe.image.clone(),
                owner: recipe.owner,
                tag_ids: recipe.tag_ids.clone(),
                ingredient_ids: recipe.ingredient_ids.clone(),
            })
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn find(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError> {
        let inner = self.lock();
        Ok(inner
            .recipes
            .iter()
            .find(|recipe| recipe.id == id && recipe.owner == owner)
            .map(|record| detail_of(&inner, record)))
    }

    async fn create(
        &self,
        owner: UserId,
        draft: RecipeDraft,
    ) -> Result<RecipeDetail, RecipePersistenceError> {
        let mut inner = self.lock();
        verify_associations(&inner, &draft.tag_ids, &draft.ingredient_ids)?;
        inner.next_recipe_id += 1;
        let record = RecipeRecord {
            id: RecipeId(inner.next_recipe_id),
            title: draft.title,
            time_minutes: draft.time_minutes,
            price: draft.price,
            image: None,
            owner,
            tag_ids: draft.tag_ids,
            ingredient_ids: draft.ingredient_ids,
        };
        inner.recipes.push(record.clone());
        Ok(detail_of(&inner, &record))
    }

    async fn replace(
        &self,
        owner: UserId,
        id: RecipeId,
        draft: RecipeDraft,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError> {
        let mut inner = self.lock();
        let Some(index) = inner
            .recipes
            .iter()
            .position(|recipe| recipe.id == id && recipe.owner == owner)
        else {
            return Ok(None);
        };
        verify_associations(&inner, &draft.tag_ids, &draft.ingredient_ids)?;
        {
            let record = &mut inner.recipes[index];
            record.title = draft.title;
            record.time_minutes = draft.time_minutes;
            record.price = draft.price;
            record.tag_ids = draft.tag_ids;
            record.ingredient_ids = draft.ingredient_ids;
        }
        let record = inner.recipes[index].clone();
        Ok(Some(detail_of(&inner, &record)))
    }

    async fn patch(
        &self,
        owner: UserId,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError> {
        let mut inner = self.lock();
        let Some(index) = inner
            .recipes
            .iter()
            .position(|recipe| recipe.id == id && recipe.owner == owner)
        else {
            return Ok(None);
        };
        verify_associations(
            &inner,
            patch.tag_ids.as_deref().unwrap_or_default(),
            patch.ingredient_ids.as_deref().unwrap_or_default(),
        )?;
        {
            let record = &mut inner.recipes[index];
            if let Some(title) = patch.title {
                record.title = title;
            }
            if let Some(time_minutes) = patch.time_minutes {
                record.time_minutes = time_minutes;
            }
            if let Some(price) = patch.price {
                record.price = price;
            }
            if let Some(tag_ids) = patch.tag_ids {
                record.tag_ids = tag_ids;
            }
            if let Some(ingredient_ids) = patch.ingredient_ids {
                record.ingredient_ids = ingredient_ids;
            }
        }
        let record = inner.recipes[index].clone();
        Ok(Some(detail_of(&inner, &record)))
    }

    async fn set_image(
        &self,
        owner: UserId,
        id: RecipeId,
        image: &str,
    ) -> Result<Option<RecipeDetail>, RecipePersistenceError> {
        let mut inner = self.lock();
        let Some(index) = inner
            .recipes
            .iter()
            .position(|recipe| recipe.id == id && recipe.owner == owner)
        else {
            return Ok(None);
        };
        inner.recipes[index].image = Some(image.to_owned());
        let record = inner.recipes[index].clone();
        Ok(Some(detail_of(&inner, &record)))
    }
}

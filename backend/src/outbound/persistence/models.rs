//! Row types bridging Diesel and the domain entities.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    EmailAddress, Ingredient, IngredientId, Recipe, RecipeDetail, RecipeId, Tag, TagId, User,
    UserId,
};

use super::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags, users};

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to the domain entity; fails when a stored email no
    /// longer satisfies the domain invariant.
    pub(super) fn into_user(self) -> Result<User, crate::domain::EmailValidationError> {
        Ok(User {
            id: UserId::from_uuid(self.id),
            email: EmailAddress::new(&self.email)?,
            password_hash: self.password_hash,
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(super) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct TagRow {
    pub id: i64,
    pub name: String,
    pub user_id: Uuid,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: TagId(row.id),
            name: row.name,
            owner: UserId::from_uuid(row.user_id),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tags)]
pub(super) struct NewTagRow<'a> {
    pub name: &'a str,
    pub user_id: Uuid,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct IngredientRow {
    pub id: i64,
    pub name: String,
    pub user_id: Uuid,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Self {
            id: IngredientId(row.id),
            name: row.name,
            owner: UserId::from_uuid(row.user_id),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ingredients)]
pub(super) struct NewIngredientRow<'a> {
    pub name: &'a str,
    pub user_id: Uuid,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct RecipeRow {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub image: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl RecipeRow {
    /// Build the summary projection from a row plus association ids.
    pub(super) fn into_summary(
        self,
        tag_ids: Vec<TagId>,
        ingredient_ids: Vec<IngredientId>,
    ) -> Recipe {
        Recipe {
            id: RecipeId(self.id),
            title: self.title,
            time_minutes: self.time_minutes,
            price: self.price,
            image: self.image,
            owner: UserId::from_uuid(self.user_id),
            tag_ids,
            ingredient_ids,
        }
    }

    /// Build the full projection from a row plus embedded associations.
    pub(super) fn into_detail(self, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> RecipeDetail {
        RecipeDetail {
            id: RecipeId(self.id),
            title: self.title,
            time_minutes: self.time_minutes,
            price: self.price,
            image: self.image,
            owner: UserId::from_uuid(self.user_id),
            tags,
            ingredients,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = recipes)]
pub(super) struct NewRecipeRow<'a> {
    pub title: &'a str,
    pub time_minutes: i32,
    pub price: Decimal,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = recipe_tags)]
pub(super) struct RecipeTagRow {
    pub recipe_id: i64,
    pub tag_id: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = recipe_ingredients)]
pub(super) struct RecipeIngredientRow {
    pub recipe_id: i64,
    pub ingredient_id: i64,
}

//! Tag, ingredient, and recipe entities with their projections.
//!
//! Recipes come in two shapes, selected explicitly by the calling
//! endpoint rather than by runtime introspection:
//! - [`Recipe`], the summary projection used by list responses, which
//!   carries associated tag/ingredient ids only.
//! - [`RecipeDetail`], the full projection used by detail responses,
//!   which embeds the associated [`Tag`] and [`Ingredient`] objects.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::user::UserId;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

define_id! {
    /// Database identifier of a [`Tag`].
    TagId
}
define_id! {
    /// Database identifier of an [`Ingredient`].
    IngredientId
}
define_id! {
    /// Database identifier of a [`Recipe`].
    RecipeId
}

/// Label a user attaches to recipes, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Stable identifier.
    pub id: TagId,
    /// Non-empty display name.
    pub name: String,
    /// Owning user.
    pub owner: UserId,
}

/// Ingredient a user attaches to recipes, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    /// Stable identifier.
    pub id: IngredientId,
    /// Non-empty display name.
    pub name: String,
    /// Owning user.
    pub owner: UserId,
}

/// Summary projection of a recipe: associations as id lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    /// Stable identifier.
    pub id: RecipeId,
    /// Non-empty title.
    pub title: String,
    /// Preparation time in minutes.
    pub time_minutes: i32,
    /// Price with exact decimal semantics.
    pub price: Decimal,
    /// Stored image reference, when one has been uploaded.
    pub image: Option<String>,
    /// Owning user.
    pub owner: UserId,
    /// Associated tag ids.
    pub tag_ids: Vec<TagId>,
    /// Associated ingredient ids.
    pub ingredient_ids: Vec<IngredientId>,
}

/// Full projection of a recipe: associations embedded as objects.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDetail {
    /// Stable identifier.
    pub id: RecipeId,
    /// Non-empty title.
    pub title: String,
    /// Preparation time in minutes.
    pub time_minutes: i32,
    /// Price with exact decimal semantics.
    pub price: Decimal,
    /// Stored image reference, when one has been uploaded.
    pub image: Option<String>,
    /// Owning user.
    pub owner: UserId,
    /// Associated tags, embedded in full.
    pub tags: Vec<Tag>,
    /// Associated ingredients, embedded in full.
    pub ingredients: Vec<Ingredient>,
}

/// Payload for creating a recipe or fully replacing one.
///
/// For a full replace, unsupplied association lists arrive empty and
/// reset the stored association sets. The image is not part of the
/// draft; it changes only through the dedicated upload operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
    /// Non-empty title.
    pub title: String,
    /// Preparation time in minutes.
    pub time_minutes: i32,
    /// Price with exact decimal semantics.
    pub price: Decimal,
    /// Tag ids to associate; replaces the full set.
    pub tag_ids: Vec<TagId>,
    /// Ingredient ids to associate; replaces the full set.
    pub ingredient_ids: Vec<IngredientId>,
}

/// Merge-patch payload: only supplied fields change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipePatch {
    /// Replacement title, when supplied.
    pub title: Option<String>,
    /// Replacement preparation time, when supplied.
    pub time_minutes: Option<i32>,
    /// Replacement price, when supplied.
    pub price: Option<Decimal>,
    /// Replacement tag id set, when supplied.
    pub tag_ids: Option<Vec<TagId>>,
    /// Replacement ingredient id set, when supplied.
    pub ingredient_ids: Option<Vec<IngredientId>>,
}

/// List filters for recipes. Empty id lists mean "no filter"; non-empty
/// lists keep recipes associated with at least one of the given ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    /// Keep recipes carrying at least one of these tags.
    pub tag_ids: Vec<TagId>,
    /// Keep recipes carrying at least one of these ingredients.
    pub ingredient_ids: Vec<IngredientId>,
}

impl RecipeFilter {
    /// True when no filtering is requested.
    pub fn is_empty(&self) -> bool {
        self.tag_ids.is_empty() && self.ingredient_ids.is_empty()
    }
}

//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the SQL in `migrations/` exactly; Diesel uses them
//! for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Account records keyed by UUID, unique on normalized email.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Normalized (lower-cased) email address, unique.
        email -> Varchar,
        /// PHC-format password hash.
        password_hash -> Varchar,
        /// Inactive accounts cannot authenticate.
        is_active -> Bool,
        /// Staff flag.
        is_staff -> Bool,
        /// Superuser flag.
        is_superuser -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// User-owned recipe tags.
    tags (id) {
        /// Primary key.
        id -> Int8,
        /// Non-empty display name.
        name -> Varchar,
        /// Owning user.
        user_id -> Uuid,
    }
}

diesel::table! {
    /// User-owned recipe ingredients.
    ingredients (id) {
        /// Primary key.
        id -> Int8,
        /// Non-empty display name.
        name -> Varchar,
        /// Owning user.
        user_id -> Uuid,
    }
}

diesel::table! {
    /// User-owned recipes.
    recipes (id) {
        /// Primary key.
        id -> Int8,
        /// Non-empty title.
        title -> Varchar,
        /// Preparation time in minutes.
        time_minutes -> Int4,
        /// Price with exact decimal semantics.
        price -> Numeric,
        /// Stored image reference, when uploaded.
        image -> Nullable<Varchar>,
        /// Owning user.
        user_id -> Uuid,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recipe/tag association rows.
    recipe_tags (recipe_id, tag_id) {
        /// Associated recipe.
        recipe_id -> Int8,
        /// Associated tag.
        tag_id -> Int8,
    }
}

diesel::table! {
    /// Recipe/ingredient association rows.
    recipe_ingredients (recipe_id, ingredient_id) {
        /// Associated recipe.
        recipe_id -> Int8,
        /// Associated ingredient.
        ingredient_id -> Int8,
    }
}

diesel::joinable!(tags -> users (user_id));
diesel::joinable!(ingredients -> users (user_id));
diesel::joinable!(recipes -> users (user_id));
diesel::joinable!(recipe_tags -> recipes (recipe_id));
diesel::joinable!(recipe_tags -> tags (tag_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    tags,
    ingredients,
    recipes,
    recipe_tags,
    recipe_ingredients,
);

#![allow(async_fn_in_trait)]

use std::collections::HashSet;

use uuid::Uuid;

use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    CartRow, Ingredient, NewIngredient, NewRecipe, NewTag, Recipe, RecipeChanges, RecipeDetail,
    RecipeFilter, RecipePreview, Tag, ToggleKind, User,
};
use crate::error::ApiError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    /// Insert a user. Returns `false` if the email or username is already taken.
    async fn create(&self, user: &User) -> Result<bool, ApiError>;

    /// Users ordered by id.
    async fn list(&self, page: PageRequest) -> Result<Page<User>, ApiError>;

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError>;
}

/// Repository for subscriptions between users.
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a subscription. Returns `false` if the pair already exists.
    async fn add(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError>;

    /// Delete a subscription. Returns `true` if a row was deleted.
    async fn remove(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError>;

    /// The subset of `author_ids` that `user_id` is subscribed to.
    async fn subscribed_among(
        &self,
        user_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, ApiError>;

    /// Authors `user_id` is subscribed to, ordered by author id.
    async fn list_authors(&self, user_id: Uuid, page: PageRequest)
    -> Result<Page<User>, ApiError>;
}

/// Repository for tags (reference data).
pub trait TagRepository: Send + Sync {
    /// All tags ordered by id.
    async fn list(&self) -> Result<Vec<Tag>, ApiError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, ApiError>;

    /// The subset of `ids` that exist.
    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError>;

    /// Insert a tag. Returns `None` if the name, color or slug is taken.
    async fn create(&self, tag: &NewTag) -> Result<Option<Tag>, ApiError>;
}

/// Repository for ingredients (reference data).
pub trait IngredientRepository: Send + Sync {
    /// Ingredients ordered by name, optionally restricted to a case-insensitive name prefix.
    async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, ApiError>;

    /// The subset of `ids` that exist.
    async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>, ApiError>;

    /// Insert an ingredient. Returns `None` if the (name, unit) pair is taken.
    async fn create(&self, ingredient: &NewIngredient) -> Result<Option<Ingredient>, ApiError>;
}

/// Repository for recipes and their tag/ingredient links.
pub trait RecipeRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, ApiError>;

    /// Persist the recipe and all its links atomically. Returns the new id.
    async fn create(&self, recipe: &NewRecipe) -> Result<i32, ApiError>;

    /// Apply scalar changes and replace both link sets atomically.
    async fn update(&self, id: i32, changes: &RecipeChanges) -> Result<(), ApiError>;

    /// Delete a recipe and everything that references it. Returns `true` if a row was deleted.
    async fn delete(&self, id: i32) -> Result<bool, ApiError>;

    /// Ids of recipes matching `filter`, newest first. Relation flags are evaluated
    /// against `viewer`; callers resolve anonymous relation filters beforehand.
    async fn list_ids(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<i32>, ApiError>;

    /// Read models for `ids`, in the order given. Unknown ids are skipped.
    async fn load_details(
        &self,
        ids: &[i32],
        viewer: Option<Uuid>,
    ) -> Result<Vec<RecipeDetail>, ApiError>;

    /// Newest-first previews of an author's recipes, truncated to `limit` when given.
    async fn previews_by_author(
        &self,
        author_id: Uuid,
        limit: Option<u64>,
    ) -> Result<Vec<RecipePreview>, ApiError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, ApiError>;
}

/// Favorite and shopping-cart membership.
pub trait EngagementRepository: Send + Sync {
    /// Insert the pair. Returns `false` if it already exists.
    async fn add(&self, kind: ToggleKind, user_id: Uuid, recipe_id: i32) -> Result<bool, ApiError>;

    /// Delete the pair. Returns `true` if a row was deleted.
    async fn remove(
        &self,
        kind: ToggleKind,
        user_id: Uuid,
        recipe_id: i32,
    ) -> Result<bool, ApiError>;

    /// Summed ingredient amounts over the user's shopping cart, sorted by name then unit.
    async fn aggregate_cart(&self, user_id: Uuid) -> Result<Vec<CartRow>, ApiError>;
}

/// Port for persisting uploaded recipe images.
pub trait ImageStore: Send + Sync {
    /// Store a `data:image/<ext>;base64,<payload>` URI and return its public reference.
    async fn save(&self, data_uri: &str) -> Result<String, ApiError>;

    /// Delete a stored image by the reference `save` returned. Unknown references are ignored.
    async fn remove(&self, reference: &str) -> Result<(), ApiError>;
}

/// Port for one-way password hashing.
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String, ApiError>;
    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, ApiError>;
}

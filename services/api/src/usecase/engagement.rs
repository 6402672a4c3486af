use tracing::info;
use uuid::Uuid;

use crate::domain::repository::{EngagementRepository, RecipeRepository};
use crate::domain::types::{RecipePreview, ToggleKind};
use crate::error::ApiError;

// ── AddToggle ────────────────────────────────────────────────────────────────

pub struct AddToggleUseCase<R: RecipeRepository, E: EngagementRepository> {
    pub recipes: R,
    pub engagements: E,
}

impl<R: RecipeRepository, E: EngagementRepository> AddToggleUseCase<R, E> {
    pub async fn execute(
        &self,
        kind: ToggleKind,
        user_id: Uuid,
        recipe_id: i32,
    ) -> Result<RecipePreview, ApiError> {
        let recipe = self
            .recipes
            .find_by_id(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;
        if !self.engagements.add(kind, user_id, recipe_id).await? {
            return Err(match kind {
                ToggleKind::Favorite => ApiError::AlreadyFavorited,
                ToggleKind::ShoppingCart => ApiError::AlreadyInShoppingCart,
            });
        }
        info!(?kind, user_id = %user_id, recipe_id, "recipe added");
        Ok(RecipePreview::from(&recipe))
    }
}

// ── RemoveToggle ─────────────────────────────────────────────────────────────

pub struct RemoveToggleUseCase<R: RecipeRepository, E: EngagementRepository> {
    pub recipes: R,
    pub engagements: E,
}

impl<R: RecipeRepository, E: EngagementRepository> RemoveToggleUseCase<R, E> {
    pub async fn execute(
        &self,
        kind: ToggleKind,
        user_id: Uuid,
        recipe_id: i32,
    ) -> Result<(), ApiError> {
        if self.recipes.find_by_id(recipe_id).await?.is_none() {
            return Err(ApiError::RecipeNotFound);
        }
        if !self.engagements.remove(kind, user_id, recipe_id).await? {
            return Err(match kind {
                ToggleKind::Favorite => ApiError::NotFavorited,
                ToggleKind::ShoppingCart => ApiError::NotInShoppingCart,
            });
        }
        info!(?kind, user_id = %user_id, recipe_id, "recipe removed");
        Ok(())
    }
}

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use foodgram_auth_types::identity::IdentityHeaders;

use crate::domain::types::ToggleKind;
use crate::error::ApiError;
use crate::handlers::recipe::RecipePreviewResponse;
use crate::state::AppState;
use crate::usecase::engagement::{AddToggleUseCase, RemoveToggleUseCase};

async fn add(
    state: AppState,
    kind: ToggleKind,
    identity: IdentityHeaders,
    recipe_id: i32,
) -> Result<(StatusCode, Json<RecipePreviewResponse>), ApiError> {
    let usecase = AddToggleUseCase {
        recipes: state.recipe_repo(),
        engagements: state.engagement_repo(),
    };
    let preview = usecase.execute(kind, identity.user_id, recipe_id).await?;
    Ok((StatusCode::CREATED, Json(preview.into())))
}

async fn remove(
    state: AppState,
    kind: ToggleKind,
    identity: IdentityHeaders,
    recipe_id: i32,
) -> Result<StatusCode, ApiError> {
    let usecase = RemoveToggleUseCase {
        recipes: state.recipe_repo(),
        engagements: state.engagement_repo(),
    };
    usecase.execute(kind, identity.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /api/recipes/{id}/favorite ──────────────────────────────────────────

pub async fn add_favorite(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<RecipePreviewResponse>), ApiError> {
    add(state, ToggleKind::Favorite, identity, id).await
}

// ── DELETE /api/recipes/{id}/favorite ────────────────────────────────────────

pub async fn remove_favorite(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    remove(state, ToggleKind::Favorite, identity, id).await
}

// ── POST /api/recipes/{id}/shopping_cart ─────────────────────────────────────

pub async fn add_to_shopping_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<RecipePreviewResponse>), ApiError> {
    add(state, ToggleKind::ShoppingCart, identity, id).await
}

// ── DELETE /api/recipes/{id}/shopping_cart ───────────────────────────────────

pub async fn remove_from_shopping_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    remove(state, ToggleKind::ShoppingCart, identity, id).await
}

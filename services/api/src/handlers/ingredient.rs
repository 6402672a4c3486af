use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_extra::extract::{Query, QueryRejection};
use serde::{Deserialize, Serialize};

use foodgram_auth_types::identity::IdentityHeaders;

use crate::domain::types::Ingredient;
use crate::error::ApiError;
use crate::handlers::{parse_body, parse_query};
use crate::state::AppState;
use crate::usecase::catalog::{
    CreateIngredientInput, CreateIngredientUseCase, GetIngredientUseCase, ListIngredientsUseCase,
};

#[derive(Serialize)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

#[derive(Deserialize, Default)]
pub struct IngredientListQuery {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

// ── GET /api/ingredients ─────────────────────────────────────────────────────

pub async fn list_ingredients(
    State(state): State<AppState>,
    query: Result<Query<IngredientListQuery>, QueryRejection>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let query = parse_query(query)?;
    let usecase = ListIngredientsUseCase {
        repo: state.ingredient_repo(),
    };
    let ingredients = usecase.execute(query.name.as_deref()).await?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

// ── GET /api/ingredients/{id} ────────────────────────────────────────────────

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let usecase = GetIngredientUseCase {
        repo: state.ingredient_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── POST /api/ingredients (admin) ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    pub measurement_unit: String,
}

pub async fn create_ingredient(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    body: Result<Json<CreateIngredientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IngredientResponse>), ApiError> {
    if !identity.user_role.is_admin() {
        return Err(ApiError::Forbidden);
    }
    let body = parse_body(body)?;
    let usecase = CreateIngredientUseCase {
        repo: state.ingredient_repo(),
    };
    let ingredient = usecase
        .execute(CreateIngredientInput {
            name: body.name,
            measurement_unit: body.measurement_unit,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ingredient.into())))
}

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_extra::extract::{Query, QueryRejection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use foodgram_auth_types::identity::{IdentityHeaders, MaybeIdentity};
use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    RecipeDetail, RecipeFilter, RecipeIngredient, RecipePreview, parse_flag,
};
use crate::error::ApiError;
use crate::handlers::{parse_body, parse_query};
use crate::handlers::tag::TagResponse;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::recipe::{
    CreateRecipeInput, CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeUseCase,
    IngredientAmountInput, ListRecipesUseCase, UpdateRecipeInput, UpdateRecipeUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i16,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(line: RecipeIngredient) -> Self {
        Self {
            id: line.id,
            name: line.name,
            measurement_unit: line.measurement_unit,
            amount: line.amount,
        }
    }
}

#[derive(Serialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i16,
}

impl From<RecipeDetail> for RecipeResponse {
    fn from(detail: RecipeDetail) -> Self {
        Self {
            id: detail.id,
            tags: detail.tags.into_iter().map(Into::into).collect(),
            author: detail.author.into(),
            ingredients: detail.ingredients.into_iter().map(Into::into).collect(),
            is_favorited: detail.is_favorited,
            is_in_shopping_cart: detail.is_in_shopping_cart,
            name: detail.name,
            image: detail.image,
            text: detail.text,
            cooking_time: detail.cooking_time,
        }
    }
}

/// Short recipe form used by favorites, the shopping cart and subscriptions.
#[derive(Serialize)]
pub struct RecipePreviewResponse {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i16,
}

impl From<RecipePreview> for RecipePreviewResponse {
    fn from(preview: RecipePreview) -> Self {
        Self {
            id: preview.id,
            name: preview.name,
            image: preview.image,
            cooking_time: preview.cooking_time,
        }
    }
}

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IngredientAmountRequest {
    pub id: i32,
    pub amount: i64,
}

impl From<IngredientAmountRequest> for IngredientAmountInput {
    fn from(entry: IngredientAmountRequest) -> Self {
        Self {
            id: entry.id,
            amount: entry.amount,
        }
    }
}

fn amounts(entries: Vec<IngredientAmountRequest>) -> Vec<IngredientAmountInput> {
    entries.into_iter().map(Into::into).collect()
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct RecipeListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Tag slugs; repeated as `tags=a&tags=b`.
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: Option<Uuid>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

fn flag(name: &str, value: Option<&str>) -> Result<Option<bool>, ApiError> {
    value
        .map(|raw| {
            parse_flag(raw)
                .ok_or_else(|| ApiError::InvalidQuery(format!("{name} must be 0, 1, true or false")))
        })
        .transpose()
}

// ── GET /api/recipes ─────────────────────────────────────────────────────────

pub async fn list_recipes(
    identity: MaybeIdentity,
    State(state): State<AppState>,
    query: Result<Query<RecipeListQuery>, QueryRejection>,
) -> Result<Json<Page<RecipeResponse>>, ApiError> {
    let query = parse_query(query)?;
    let filter = RecipeFilter {
        is_favorited: flag("is_favorited", query.is_favorited.as_deref())?,
        is_in_shopping_cart: flag("is_in_shopping_cart", query.is_in_shopping_cart.as_deref())?,
        tag_slugs: query.tags,
        author_id: query.author,
    };
    let page = PageRequest::from_query(query.limit, query.page).clamped();

    let usecase = ListRecipesUseCase {
        recipes: state.recipe_repo(),
    };
    let recipes = usecase.execute(filter, identity.user_id(), page).await?;
    Ok(Json(recipes.map(RecipeResponse::from)))
}

// ── GET /api/recipes/{id} ────────────────────────────────────────────────────

pub async fn get_recipe(
    identity: MaybeIdentity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let usecase = GetRecipeUseCase {
        recipes: state.recipe_repo(),
    };
    let recipe = usecase.execute(id, identity.user_id()).await?;
    Ok(Json(recipe.into()))
}

// ── POST /api/recipes ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateRecipeRequest {
    pub ingredients: Vec<IngredientAmountRequest>,
    pub tags: Vec<i32>,
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
}

pub async fn create_recipe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    body: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    let body = parse_body(body)?;
    let usecase = CreateRecipeUseCase {
        recipes: state.recipe_repo(),
        tags: state.tag_repo(),
        ingredients: state.ingredient_repo(),
        images: state.image_store(),
    };
    let recipe = usecase
        .execute(
            identity.user_id,
            CreateRecipeInput {
                name: body.name,
                image: body.image,
                text: body.text,
                cooking_time: body.cooking_time,
                tags: body.tags,
                ingredients: amounts(body.ingredients),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

// ── PATCH /api/recipes/{id} ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateRecipeRequest {
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
    pub tags: Option<Vec<i32>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

pub async fn update_recipe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Result<Json<UpdateRecipeRequest>, JsonRejection>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let body = parse_body(body)?;
    let usecase = UpdateRecipeUseCase {
        recipes: state.recipe_repo(),
        tags: state.tag_repo(),
        ingredients: state.ingredient_repo(),
        images: state.image_store(),
    };
    let recipe = usecase
        .execute(
            id,
            identity.user_id,
            UpdateRecipeInput {
                name: body.name,
                image: body.image,
                text: body.text,
                cooking_time: body.cooking_time,
                tags: body.tags,
                ingredients: body.ingredients.map(amounts),
            },
        )
        .await?;
    Ok(Json(recipe.into()))
}

// ── DELETE /api/recipes/{id} ─────────────────────────────────────────────────

pub async fn delete_recipe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteRecipeUseCase {
        recipes: state.recipe_repo(),
        images: state.image_store(),
    };
    usecase.execute(id, identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

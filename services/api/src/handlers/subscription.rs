use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::{Query, QueryRejection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use foodgram_auth_types::identity::IdentityHeaders;
use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::types::SubscribedAuthor;
use crate::error::ApiError;
use crate::handlers::parse_query;
use crate::handlers::recipe::RecipePreviewResponse;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::subscription::{
    ListSubscriptionsUseCase, SubscribeUseCase, UnsubscribeUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub author: UserResponse,
    pub recipes: Vec<RecipePreviewResponse>,
    pub recipes_count: u64,
}

impl From<SubscribedAuthor> for SubscriptionResponse {
    fn from(entry: SubscribedAuthor) -> Self {
        Self {
            author: entry.profile.into(),
            recipes: entry.recipes.into_iter().map(Into::into).collect(),
            recipes_count: entry.recipes_count,
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct SubscriptionQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub recipes_limit: Option<u32>,
}

// ── GET /api/users/subscriptions ─────────────────────────────────────────────

pub async fn list_subscriptions(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    query: Result<Query<SubscriptionQuery>, QueryRejection>,
) -> Result<Json<Page<SubscriptionResponse>>, ApiError> {
    let query = parse_query(query)?;
    let page = PageRequest::from_query(query.limit, query.page).clamped();
    let usecase = ListSubscriptionsUseCase {
        subscriptions: state.subscription_repo(),
        recipes: state.recipe_repo(),
    };
    let authors = usecase
        .execute(identity.user_id, query.recipes_limit.map(u64::from), page)
        .await?;
    Ok(Json(authors.map(SubscriptionResponse::from)))
}

// ── POST /api/users/{id}/subscribe ───────────────────────────────────────────

pub async fn subscribe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
    query: Result<Query<SubscriptionQuery>, QueryRejection>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let query = parse_query(query)?;
    let usecase = SubscribeUseCase {
        users: state.user_repo(),
        subscriptions: state.subscription_repo(),
        recipes: state.recipe_repo(),
    };
    let author = usecase
        .execute(
            identity.user_id,
            author_id,
            query.recipes_limit.map(u64::from),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(author.into())))
}

// ── DELETE /api/users/{id}/subscribe ─────────────────────────────────────────

pub async fn unsubscribe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = UnsubscribeUseCase {
        subscriptions: state.subscription_repo(),
    };
    usecase.execute(identity.user_id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

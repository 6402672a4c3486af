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

use crate::domain::types::UserProfile;
use crate::error::ApiError;
use crate::handlers::{parse_body, parse_query};
use crate::state::AppState;
use crate::usecase::user::{
    GetMeUseCase, GetUserUseCase, ListUsersUseCase, RegisterUserInput, RegisterUserUseCase,
    SetPasswordInput, SetPasswordUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl From<UserProfile> for UserResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            username: profile.username,
            first_name: profile.first_name,
            last_name: profile.last_name,
            is_subscribed: profile.is_subscribed,
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.limit, self.page).clamped()
    }
}

// ── POST /api/users ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let body = parse_body(body)?;
    let usecase = RegisterUserUseCase {
        repo: state.user_repo(),
        hasher: state.password_hasher(),
    };
    let profile = usecase
        .execute(RegisterUserInput {
            email: body.email,
            username: body.username,
            first_name: body.first_name,
            last_name: body.last_name,
            password: body.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(profile.into())))
}

// ── GET /api/users ───────────────────────────────────────────────────────────

pub async fn list_users(
    identity: MaybeIdentity,
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    let query = parse_query(query)?;
    let usecase = ListUsersUseCase {
        repo: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    let users = usecase
        .execute(identity.user_id(), query.page_request())
        .await?;
    Ok(Json(users.map(UserResponse::from)))
}

// ── GET /api/users/{id} ──────────────────────────────────────────────────────

pub async fn get_user(
    identity: MaybeIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    let profile = usecase.execute(id, identity.user_id()).await?;
    Ok(Json(profile.into()))
}

// ── GET /api/users/me ────────────────────────────────────────────────────────

pub async fn get_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let usecase = GetMeUseCase {
        repo: state.user_repo(),
    };
    let profile = usecase.execute(identity.user_id).await?;
    Ok(Json(profile.into()))
}

// ── POST /api/users/set_password ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn set_password(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    body: Result<Json<SetPasswordRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let body = parse_body(body)?;
    let usecase = SetPasswordUseCase {
        repo: state.user_repo(),
        hasher: state.password_hasher(),
    };
    usecase
        .execute(
            identity.user_id,
            SetPasswordInput {
                current_password: body.current_password,
                new_password: body.new_password,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

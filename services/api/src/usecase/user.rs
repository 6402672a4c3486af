use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{PasswordHasher, SubscriptionRepository, UserRepository};
use crate::domain::types::{
    PERSON_NAME_MAX_LEN, User, UserProfile, validate_email, validate_password, validate_username,
};
use crate::error::ApiError;

// ── RegisterUser ─────────────────────────────────────────────────────────────

pub struct RegisterUserInput {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

pub struct RegisterUserUseCase<R: UserRepository, H: PasswordHasher> {
    pub repo: R,
    pub hasher: H,
}

impl<R: UserRepository, H: PasswordHasher> RegisterUserUseCase<R, H> {
    pub async fn execute(&self, input: RegisterUserInput) -> Result<UserProfile, ApiError> {
        let email = input.email.trim().to_owned();
        if !validate_email(&email) {
            return Err(ApiError::validation("email", "must be a valid email address"));
        }
        if !validate_username(&input.username) {
            return Err(ApiError::validation(
                "username",
                "1-150 characters: letters, digits and _ . @ + -",
            ));
        }
        let first_name = person_name("first_name", &input.first_name)?;
        let last_name = person_name("last_name", &input.last_name)?;
        if !validate_password(&input.password) {
            return Err(ApiError::validation(
                "password",
                "must be at least 8 characters",
            ));
        }

        let user = User {
            id: Uuid::now_v7(),
            email,
            username: input.username,
            first_name,
            last_name,
            password_hash: self.hasher.hash(&input.password).await?,
            created_at: Utc::now(),
        };
        if !self.repo.create(&user).await? {
            return Err(ApiError::UserAlreadyExists);
        }
        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(UserProfile::of(&user, false))
    }
}

fn person_name(field: &'static str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(field, "must not be blank"));
    }
    if trimmed.chars().count() > PERSON_NAME_MAX_LEN {
        return Err(ApiError::validation(field, "must be at most 150 characters"));
    }
    Ok(trimmed.to_owned())
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository, S: SubscriptionRepository> {
    pub repo: R,
    pub subscriptions: S,
}

impl<R: UserRepository, S: SubscriptionRepository> GetUserUseCase<R, S> {
    pub async fn execute(&self, id: Uuid, viewer: Option<Uuid>) -> Result<UserProfile, ApiError> {
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        let is_subscribed = match viewer {
            Some(viewer) if viewer != id => self
                .subscriptions
                .subscribed_among(viewer, &[id])
                .await?
                .contains(&id),
            _ => false,
        };
        Ok(UserProfile::of(&user, is_subscribed))
    }
}

// ── GetMe ────────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetMeUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<UserProfile, ApiError> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        Ok(UserProfile::of(&user, false))
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository, S: SubscriptionRepository> {
    pub repo: R,
    pub subscriptions: S,
}

impl<R: UserRepository, S: SubscriptionRepository> ListUsersUseCase<R, S> {
    pub async fn execute(
        &self,
        viewer: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Page<UserProfile>, ApiError> {
        let users = self.repo.list(page).await?;
        let subscribed = match viewer {
            Some(viewer) => {
                let ids: Vec<Uuid> = users.results.iter().map(|u| u.id).collect();
                self.subscriptions.subscribed_among(viewer, &ids).await?
            }
            None => Default::default(),
        };
        Ok(users.map(|user| UserProfile::of(&user, subscribed.contains(&user.id))))
    }
}

// ── SetPassword ──────────────────────────────────────────────────────────────

pub struct SetPasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct SetPasswordUseCase<R: UserRepository, H: PasswordHasher> {
    pub repo: R,
    pub hasher: H,
}

impl<R: UserRepository, H: PasswordHasher> SetPasswordUseCase<R, H> {
    pub async fn execute(&self, user_id: Uuid, input: SetPasswordInput) -> Result<(), ApiError> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if !self
            .hasher
            .verify(&input.current_password, &user.password_hash)
            .await?
        {
            return Err(ApiError::InvalidPassword);
        }
        if !validate_password(&input.new_password) {
            return Err(ApiError::validation(
                "new_password",
                "must be at least 8 characters",
            ));
        }
        let password_hash = self.hasher.hash(&input.new_password).await?;
        self.repo
            .update_password_hash(user_id, &password_hash)
            .await?;
        info!(user_id = %user_id, "password changed");
        Ok(())
    }
}

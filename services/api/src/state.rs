use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbEngagementRepository, DbIngredientRepository, DbRecipeRepository, DbSubscriptionRepository,
    DbTagRepository, DbUserRepository,
};
use crate::infra::image::FsImageStore;
use crate::infra::password::Argon2PasswordHasher;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub images: FsImageStore,
    pub hasher: Argon2PasswordHasher,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn subscription_repo(&self) -> DbSubscriptionRepository {
        DbSubscriptionRepository {
            db: self.db.clone(),
        }
    }

    pub fn tag_repo(&self) -> DbTagRepository {
        DbTagRepository {
            db: self.db.clone(),
        }
    }

    pub fn ingredient_repo(&self) -> DbIngredientRepository {
        DbIngredientRepository {
            db: self.db.clone(),
        }
    }

    pub fn recipe_repo(&self) -> DbRecipeRepository {
        DbRecipeRepository {
            db: self.db.clone(),
        }
    }

    pub fn engagement_repo(&self) -> DbEngagementRepository {
        DbEngagementRepository {
            db: self.db.clone(),
        }
    }

    pub fn image_store(&self) -> FsImageStore {
        self.images.clone()
    }

    pub fn password_hasher(&self) -> Argon2PasswordHasher {
        self.hasher
    }
}

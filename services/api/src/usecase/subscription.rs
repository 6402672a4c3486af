use tracing::info;
use uuid::Uuid;

use foodgram_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{RecipeRepository, SubscriptionRepository, UserRepository};
use crate::domain::types::{SubscribedAuthor, User, UserProfile};
use crate::error::ApiError;

/// Build the subscription view of `author`: previews truncated to `recipes_limit`,
/// count over all of the author's recipes.
async fn subscribed_author<R: RecipeRepository>(
    recipes: &R,
    author: &User,
    recipes_limit: Option<u64>,
) -> Result<SubscribedAuthor, ApiError> {
    Ok(SubscribedAuthor {
        profile: UserProfile::of(author, true),
        recipes: recipes.previews_by_author(author.id, recipes_limit).await?,
        recipes_count: recipes.count_by_author(author.id).await?,
    })
}

// ── Subscribe ────────────────────────────────────────────────────────────────

pub struct SubscribeUseCase<U: UserRepository, S: SubscriptionRepository, R: RecipeRepository> {
    pub users: U,
    pub subscriptions: S,
    pub recipes: R,
}

impl<U: UserRepository, S: SubscriptionRepository, R: RecipeRepository> SubscribeUseCase<U, S, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        author_id: Uuid,
        recipes_limit: Option<u64>,
    ) -> Result<SubscribedAuthor, ApiError> {
        if user_id == author_id {
            return Err(ApiError::SelfSubscription);
        }
        let author = self
            .users
            .find_by_id(author_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if !self.subscriptions.add(user_id, author_id).await? {
            return Err(ApiError::AlreadySubscribed);
        }
        info!(user_id = %user_id, author_id = %author_id, "subscribed");
        subscribed_author(&self.recipes, &author, recipes_limit).await
    }
}

// ── Unsubscribe ──────────────────────────────────────────────────────────────

pub struct UnsubscribeUseCase<S: SubscriptionRepository> {
    pub subscriptions: S,
}

impl<S: SubscriptionRepository> UnsubscribeUseCase<S> {
    pub async fn execute(&self, user_id: Uuid, author_id: Uuid) -> Result<(), ApiError> {
        if user_id == author_id || !self.subscriptions.remove(user_id, author_id).await? {
            return Err(ApiError::NotSubscribed);
        }
        info!(user_id = %user_id, author_id = %author_id, "unsubscribed");
        Ok(())
    }
}

// ── ListSubscriptions ────────────────────────────────────────────────────────

pub struct ListSubscriptionsUseCase<S: SubscriptionRepository, R: RecipeRepository> {
    pub subscriptions: S,
    pub recipes: R,
}

impl<S: SubscriptionRepository, R: RecipeRepository> ListSubscriptionsUseCase<S, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        recipes_limit: Option<u64>,
        page: PageRequest,
    ) -> Result<Page<SubscribedAuthor>, ApiError> {
        let authors = self.subscriptions.list_authors(user_id, page).await?;
        let mut results = Vec::with_capacity(authors.results.len());
        for author in &authors.results {
            results.push(subscribed_author(&self.recipes, author, recipes_limit).await?);
        }
        Ok(Page {
            count: authors.count,
            results,
        })
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API error variants. Every variant except `Internal` is a caller mistake.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("cannot subscribe to yourself")]
    SelfSubscription,
    #[error("already subscribed to this author")]
    AlreadySubscribed,
    #[error("invalid password")]
    InvalidPassword,
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("invalid body: {0}")]
    InvalidBody(String),
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("recipe not found")]
    RecipeNotFound,
    #[error("tag not found")]
    TagNotFound,
    #[error("ingredient not found")]
    IngredientNotFound,
    #[error("not subscribed to this author")]
    NotSubscribed,
    #[error("recipe is not in favorites")]
    NotFavorited,
    #[error("recipe is not in shopping cart")]
    NotInShoppingCart,
    #[error("recipe is already in favorites")]
    AlreadyFavorited,
    #[error("recipe is already in shopping cart")]
    AlreadyInShoppingCart,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("tag already exists")]
    TagAlreadyExists,
    #[error("ingredient already exists")]
    IngredientAlreadyExists,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::SelfSubscription => "SELF_SUBSCRIPTION",
            Self::AlreadySubscribed => "ALREADY_SUBSCRIBED",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::RecipeNotFound => "RECIPE_NOT_FOUND",
            Self::TagNotFound => "TAG_NOT_FOUND",
            Self::IngredientNotFound => "INGREDIENT_NOT_FOUND",
            Self::NotSubscribed => "NOT_SUBSCRIBED",
            Self::NotFavorited => "NOT_FAVORITED",
            Self::NotInShoppingCart => "NOT_IN_SHOPPING_CART",
            Self::AlreadyFavorited => "ALREADY_FAVORITED",
            Self::AlreadyInShoppingCart => "ALREADY_IN_SHOPPING_CART",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::TagAlreadyExists => "TAG_ALREADY_EXISTS",
            Self::IngredientAlreadyExists => "INGREDIENT_ALREADY_EXISTS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::SelfSubscription
            | Self::AlreadySubscribed
            | Self::InvalidPassword
            | Self::InvalidQuery(_)
            | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::RecipeNotFound
            | Self::TagNotFound
            | Self::IngredientNotFound
            | Self::NotSubscribed
            | Self::NotFavorited
            | Self::NotInShoppingCart => StatusCode::NOT_FOUND,
            Self::AlreadyFavorited
            | Self::AlreadyInShoppingCart
            | Self::UserAlreadyExists
            | Self::TagAlreadyExists
            | Self::IngredientAlreadyExists => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

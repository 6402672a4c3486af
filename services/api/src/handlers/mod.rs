use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum_extra::extract::{Query, QueryRejection};

use crate::error::ApiError;

pub mod cart;
pub mod engagement;
pub mod health;
pub mod ingredient;
pub mod recipe;
pub mod subscription;
pub mod tag;
pub mod user;

/// Unwrap a query extraction, reporting malformed query strings as `INVALID_QUERY`.
fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| ApiError::InvalidQuery(rejection.to_string()))
}

/// Unwrap a JSON body extraction, reporting unreadable or mistyped bodies as `INVALID_BODY`.
fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(body)| body)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to appropriate HTTP responses.
//! Every error body has the shape `{"message": "..."}`.

use crate::repositories::StoreError;
use authgate_shared::MessageResponse;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("User already exists")]
    DuplicateUser,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidPassword,

    /// Missing or malformed `Authorization` header
    #[error("{0}")]
    Unauthorized(String),

    /// Bad signature or expired token; callers cannot tell which
    #[error("Forbidden access")]
    InvalidOrExpiredToken,

    #[error("Forbidden access")]
    InsufficientRole,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Store error")]
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::DuplicateUser,
            other => ApiError::Store(other),
        }
    }
}

/// Unparseable or incomplete JSON bodies are client errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::DuplicateUser | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidPassword | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidOrExpiredToken | ApiError::InsufficientRole => StatusCode::FORBIDDEN,
            ApiError::Internal(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                "An internal error occurred".to_string()
            }
            ApiError::Store(err) => {
                error!("Store error: {:?}", err);
                "An internal error occurred".to_string()
            }
            ApiError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        };

        (status, Json(MessageResponse { message })).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

//! Central error type and its HTTP mapping.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    auth::{jwt::TokenError, password::HashError},
    users::{repo::StoreError, validation::ValidationError},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("email already registered")]
    DuplicateKey,

    #[error("user not found")]
    NotFound,

    /// Unknown email and wrong password both end up here.
    #[error("invalid email or password")]
    AuthenticationFailed,

    #[error(transparent)]
    Token(TokenError),

    #[error(transparent)]
    Hashing(#[from] HashError),

    #[error("storage error: {0}")]
    Store(#[source] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey => AppError::DuplicateKey,
            StoreError::NotFound => AppError::NotFound,
            StoreError::Backend(e) => AppError::Store(e),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        AppError::Token(e)
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateKey => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            AppError::Token(TokenError::Signing(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::Hashing(_) | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::DuplicateKey => "duplicate_key",
            AppError::NotFound => "not_found",
            AppError::AuthenticationFailed => "authentication_failed",
            AppError::Token(TokenError::Signing(_)) => "internal_error",
            AppError::Token(_) => "unauthorized",
            AppError::Hashing(_) | AppError::Store(_) => "internal_error",
        }
    }

    /// Message safe to hand to the caller. Token failures share one text and
    /// internal failures never echo their cause.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Token(TokenError::Signing(_)) | AppError::Hashing(_) | AppError::Store(_) => {
                "internal server error".to_string()
            }
            AppError::Token(_) => "invalid or expired token".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(error = %self, %status, "request rejected");
        }
        let body = json!({
            "error": self.error_code(),
            "message": self.public_message(),
        });
        (status, Json(body)).into_response()
    }
}

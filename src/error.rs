//! Error responses of the companion API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::types::ErrorBody;

/// Every way an API route can fail. Rendered as `{"error": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Body missing, not JSON, or without a string `message`.
    #[error("No message provided")]
    MissingMessage,

    #[error("Empty message")]
    EmptyMessage,

    #[error("Endpoint not found")]
    NotFound,

    #[error("Request timed out")]
    Timeout,

    /// Details are logged, never sent to the client.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingMessage | Self::EmptyMessage => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(error = %detail, "Internal server error");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

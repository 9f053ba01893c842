use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::error_payload::ErrorPayload;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A required secret is absent from the environment.
    #[error("Missing credential: {0} environment variable is required")]
    MissingCredential(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("{0}")]
    NotFound(String),

    /// A stored document failed to decode into a leaderboard entity.
    #[error("Malformed document {key}: {reason}")]
    MalformedDocument { key: String, reason: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("An error occurred while processing the request: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("An error occurred while accessing the entity store: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Internal server error")]
    InternalServerError(),
}

impl AppError {
    pub fn code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MissingCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MalformedDocument { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RequestError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RedisError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError() => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> String {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::MissingCredential(_) => "MISSING_CREDENTIAL",
            AppError::InvalidCredential(_) => "INVALID_CREDENTIAL",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::MalformedDocument { .. } => "MALFORMED_DOCUMENT",
            AppError::InvalidQuery(_) => "INVALID_QUERY",
            AppError::UpstreamFailure(_) => "UPSTREAM_FAILURE",
            AppError::RequestError(_) => "REQUEST_ERROR",
            AppError::RedisError(_) => "REDIS_ERROR",
            AppError::SerializationError(_) => "SERIALIZATION_ERROR",
            AppError::InternalServerError() => "INTERNAL_SERVER_ERROR",
        }
        .to_string()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code();
        (status, Json(ErrorPayload::from(&self))).into_response()
    }
}

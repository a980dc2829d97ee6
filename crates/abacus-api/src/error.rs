//! Error handling for the Abacus API
//!
//! Every failure maps to an HTTP status and a stable `errorCode` and is
//! rendered as an [`ErrorResponse`] envelope.

use crate::types::ErrorResponse;
use abacus_core::{AbacusError, EvaluationRecord};
use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::error;

/// API error type with automatic HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing request body (400)
    #[error("Request body is invalid")]
    InvalidRequestBody { details: String },

    /// The expression was evaluated and recorded but failed (400)
    #[error("Invalid expression")]
    InvalidExpression { record: Box<EvaluationRecord> },

    /// Batch exceeds the configured size (400)
    #[error("Batch too large")]
    BatchTooLarge { size: usize, limit: usize },

    /// Expression exceeds the configured length (400)
    #[error("Expression too long")]
    ExpressionTooLong { length: usize, limit: usize },

    /// Rate limiting (429)
    #[error("Too many requests")]
    RateLimited { retry_after_seconds: u64 },

    /// Internal server errors (500)
    #[error("Internal error")]
    Internal { message: String },
}

impl ApiError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequestBody { .. }
            | ApiError::InvalidExpression { .. }
            | ApiError::BatchTooLarge { .. }
            | ApiError::ExpressionTooLong { .. } => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequestBody { .. } => "E4007700",
            ApiError::InvalidExpression { .. } => "E4007701",
            ApiError::BatchTooLarge { .. } => "E4007702",
            ApiError::ExpressionTooLong { .. } => "E4007703",
            ApiError::RateLimited { .. } => "E4297701",
            ApiError::Internal { .. } => "E5007700",
        }
    }

    /// Human-readable detail for the `description` field
    pub fn description(&self) -> String {
        match self {
            ApiError::InvalidRequestBody { details } => details.clone(),
            ApiError::InvalidExpression { record } => {
                record.error().unwrap_or("expression could not be evaluated").to_string()
            }
            ApiError::BatchTooLarge { size, limit } => {
                format!("batch contains {size} expressions, the maximum is {limit}")
            }
            ApiError::ExpressionTooLong { length, limit } => {
                format!("expression is {length} characters long, the maximum is {limit}")
            }
            ApiError::RateLimited { .. } => "Please try again later".to_string(),
            // Internal details stay in the logs.
            ApiError::Internal { .. } => "Something went wrong".to_string(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let data = match self {
            ApiError::InvalidExpression { record } => serde_json::to_value(record.as_ref()).ok(),
            _ => None,
        };

        ErrorResponse {
            status_code: self.status_code().as_u16(),
            message: self.to_string(),
            description: self.description(),
            error_code: self.error_code().to_string(),
            data,
        }
    }

    pub fn invalid_body(details: impl Into<String>) -> Self {
        Self::InvalidRequestBody { details: details.into() }
    }

    pub fn invalid_expression(record: EvaluationRecord) -> Self {
        Self::InvalidExpression { record: Box::new(record) }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { message } = &self {
            error!(error = %message, "Internal error while handling request");
        }

        let status = self.status_code();
        let mut response = (status, Json(self.to_response())).into_response();

        if let ApiError::RateLimited { retry_after_seconds } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<AbacusError> for ApiError {
    fn from(err: AbacusError) -> Self {
        ApiError::internal(format!("{} ({})", err, err.category()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_body(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::internal(format!("evaluation task failed: {err}"))
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

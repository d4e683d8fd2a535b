// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::manager::DatabaseError;
use crate::database::record::RecordError;
use crate::filter::FilterError;
use crate::validation::ValidationError;

/// Every non-success outcome a controller can produce. Each variant maps to
/// exactly one envelope kind.
#[derive(Debug)]
pub enum ApiError {
    // 422 Unprocessable Entity
    ValidationError(String),

    // 200 OK with a RECORD_NOT_FOUND status; an empty result is not a failure
    RecordNotFound,

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RecordNotFound => StatusCode::OK,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the envelope's `status` field
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::RecordNotFound => "RECORD_NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InternalServerError(_) => "FAILURE",
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError(msg) => msg,
            ApiError::RecordNotFound => "Record not found with specified criteria.",
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "status": self.error_code(),
            "message": self.message(),
            "data": Value::Null,
        })
    }
}

impl ApiError {
    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    pub fn record_not_found() -> Self {
        ApiError::RecordNotFound
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    /// Payload failed its schema; the message carries the first violation
    pub fn invalid_parameters(err: ValidationError) -> Self {
        ApiError::validation_error(format!("Invalid values in parameters, {}", err.message))
    }

    /// A required body field is absent or empty
    pub fn insufficient_parameters(field: &str) -> Self {
        ApiError::bad_request(format!("Insufficient request parameters! {} is required.", field))
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation_error(err.message)
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::validation_error(err.to_string())
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        ApiError::validation_error(format!("Invalid values in parameters, {}", err))
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Filter(e) => e.into(),
            DatabaseError::Record(e) => e.into(),
            DatabaseError::UniqueViolation(_) => {
                tracing::warn!("Rejected write: {}", err);
                ApiError::internal_server_error(err.to_string())
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Internal server error.")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("Internal server error.")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

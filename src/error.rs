// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// Central error taxonomy. Handlers are thin pass-throughs: whatever a
/// validator, the policy engine, or a directory raises ends up here and is
/// mapped to a status code and a client-safe message.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request: malformed or missing input; message names the first
    // failing field and the violated rule
    Validation(String),

    // 401 Unauthorized: missing/invalid/expired token, bad credentials,
    // or an unverified account
    Unauthorized(String),

    // 403 Forbidden: role or ownership check failed
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 422 Unprocessable Entity: uniqueness conflict
    Conflict(String),

    // 500 Internal Server Error: unclassified; no internal detail leaked
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg,
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "success": 0,
            "data": self.message(),
        })
    }
}

// Static constructors
impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::not_found("Record not found"),
            sqlx::Error::Database(db_err) => {
                // Unique-constraint violations surface as a conflict; the
                // client only learns that the record already exists
                if db_err.code().as_deref() == Some("23505") {
                    ApiError::conflict("Already exists")
                } else {
                    tracing::error!("database error: {}", db_err);
                    ApiError::internal("Server side error")
                }
            }
            other => {
                tracing::error!("sqlx error: {}", other);
                ApiError::internal("Server side error")
            }
        }
    }
}

impl From<crate::filter::FilterError> for ApiError {
    fn from(err: crate::filter::FilterError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<crate::auth::TokenError> for ApiError {
    fn from(err: crate::auth::TokenError) -> Self {
        tracing::error!("{}", err);
        ApiError::internal("Server side error")
    }
}

impl From<crate::auth::password::PasswordError> for ApiError {
    fn from(err: crate::auth::password::PasswordError) -> Self {
        tracing::error!("{}", err);
        ApiError::internal("Server side error")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

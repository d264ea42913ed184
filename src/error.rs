use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::{error, warn};

#[derive(Debug, ThisError)]
pub enum GuardError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Target {0} not found")]
    TargetNotFound(i64),

    #[error("Upstream pagination error: {0}")]
    Pagination(String),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Auth provider rejected request ({code}): {message}")]
    AuthRejected { code: String, message: String },

    #[error("Auth provider is not configured")]
    AuthUnavailable,

    #[error("User not found")]
    UserNotFound,

    #[error("Signup failed: {0}")]
    ProfileInsert(String),

    #[error("Assistant rate limit exceeded")]
    RateLimited,

    #[error("Assistant is not configured")]
    AssistantUnavailable,
}

impl From<figment::Error> for GuardError {
    fn from(e: figment::Error) -> Self {
        GuardError::Figment(Box::new(e))
    }
}

/// Whether an operation failing with this error is worth retrying.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for GuardError {
    fn is_retryable(&self) -> bool {
        match self {
            GuardError::Reqwest(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            GuardError::UpstreamStatus(code) => {
                code.is_server_error() || *code == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            GuardError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                format!("{field} is required"),
            ),
            GuardError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            GuardError::TargetNotFound(_) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string())
            }
            GuardError::AuthRejected { message, .. } => (
                StatusCode::BAD_REQUEST,
                "AUTH_REJECTED",
                message.clone(),
            ),
            GuardError::UserNotFound => (
                StatusCode::BAD_REQUEST,
                "USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            GuardError::ProfileInsert(_) => (
                StatusCode::BAD_REQUEST,
                "SIGNUP_FAILED",
                "Signup failed!".to_string(),
            ),
            GuardError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMIT",
                "Too many assistant requests; try again shortly.".to_string(),
            ),
            GuardError::AssistantUnavailable | GuardError::AuthUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UNAVAILABLE",
                self.to_string(),
            ),
            GuardError::DatabaseError(_)
            | GuardError::Figment(_)
            | GuardError::InvalidConfig { .. } => {
                error!(error = %self, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred.".to_string(),
                )
            }
            GuardError::Reqwest(_)
            | GuardError::UrlParse(_)
            | GuardError::Json(_)
            | GuardError::Pagination(_) => {
                warn!(error = %self, "upstream failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "BAD_GATEWAY",
                    "Upstream service is unavailable.".to_string(),
                )
            }
            GuardError::UpstreamStatus(code) => {
                let (err_code, msg) = match *code {
                    StatusCode::TOO_MANY_REQUESTS => {
                        ("RATE_LIMIT", "Upstream rate limit exceeded.")
                    }
                    StatusCode::UNAUTHORIZED => ("UNAUTHORIZED", "Upstream authentication failed."),
                    StatusCode::FORBIDDEN => ("FORBIDDEN", "Upstream permission denied."),
                    StatusCode::NOT_FOUND => ("NOT_FOUND", "Upstream resource not found."),
                    _ => ("UPSTREAM_ERROR", "An upstream error occurred."),
                };
                let status = if code.is_client_error() || code.is_server_error() {
                    *code
                } else {
                    StatusCode::BAD_GATEWAY
                };
                (status, err_code, msg.to_string())
            }
        };

        let body = ApiErrorResponse {
            success: false,
            error: ApiErrorBody {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorBody,
}

use crate::envelope::Envelope;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use core_auth::Feedback;
use core_library::LibraryError;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// The request-level operation an error occurred in. Picks the generic
/// message returned for unexpected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    List,
    Get,
    Update,
    Delete,
    Logout,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Logout => "logout",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Operation::Create => "An error occurred while creating lyrics",
            Operation::List | Operation::Get => "An error occurred while retrieving lyrics",
            Operation::Update => "An error occurred while updating lyrics",
            Operation::Delete => "An error occurred while deleting lyrics",
            Operation::Logout => "Logout failed: Could not destroy session",
        }
    }

    fn not_found_message(&self) -> &'static str {
        match self {
            Operation::Update => "Lyrics not found or you do not have permission to update",
            Operation::Delete => "Lyrics not found or you do not have permission to delete",
            _ => "Lyrics not found",
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Maximum number of lyrics reached ({limit}). Please delete some lyrics to create new ones.")]
    QuotaExceeded { limit: u32 },

    #[error("{}", .operation.not_found_message())]
    NotFound { operation: Operation },

    #[error("Too many requests. Please try again later.")]
    RateLimited { retry_after: Duration },

    #[error("Authentication required")]
    Unauthorized,

    #[error("{}", .feedback.message)]
    Credentials { feedback: Feedback },

    #[error("{}", .operation.failure_message())]
    Unexpected { operation: Operation },
}

impl ApiError {
    pub fn invalid_input() -> Self {
        ApiError::InvalidInput("Invalid input".to_string())
    }

    /// Logs `cause` with the operation and hides it behind a generic message.
    pub fn unexpected(operation: Operation, cause: impl std::fmt::Display) -> Self {
        error!(operation = operation.as_str(), error = %cause, "Request failed");
        ApiError::Unexpected { operation }
    }

    /// Maps a repository failure for `operation`.
    pub fn from_library(operation: Operation, err: LibraryError) -> Self {
        match err {
            LibraryError::InvalidInput { message, .. } => {
                ApiError::InvalidInput(message).audited(operation)
            }
            LibraryError::QuotaExceeded { limit } => {
                ApiError::QuotaExceeded { limit }.audited(operation)
            }
            LibraryError::NotFound { .. } => ApiError::NotFound { operation }.audited(operation),
            other => ApiError::unexpected(operation, other),
        }
    }

    /// Records a refused request in the current span. Unexpected failures
    /// are logged where they are created.
    pub fn audited(self, operation: Operation) -> Self {
        let operation_name = operation.as_str();
        match &self {
            ApiError::InvalidInput(reason) => {
                info!(operation = operation_name, reason = %reason, "Rejected invalid lyrics input");
            }
            ApiError::QuotaExceeded { limit } => {
                warn!(operation = operation_name, limit = *limit, "Lyrics quota reached");
            }
            ApiError::NotFound { .. } => {
                warn!(operation = operation_name, "Lyrics not found for owner");
            }
            _ => {}
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_)
            | ApiError::QuotaExceeded { .. }
            | ApiError::Credentials { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = Envelope::<()>::failure(self.to_string());
        if let ApiError::Credentials { feedback } = &self {
            body = body.with_field(feedback.field);
        }

        let mut response = (status, Json(body)).into_response();

        if let ApiError::RateLimited { retry_after } = self {
            // Round up so clients never retry a moment too early.
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }

        response
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures while starting or running the server.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to open lyrics store: {0}")]
    Store(#[from] LibraryError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

use crate::response::Metadata;

/// Closed set of error codes exposed to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict,
    InternalError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::Unauthorized => "Unauthorized access",
            ErrorCode::Forbidden => "Access forbidden",
            ErrorCode::Conflict => "Resource already exists",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

/// Error raised anywhere below a handler and rendered once as the JSON
/// error envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Api {
        code: ErrorCode,
        message: String,
        details: Option<Value>,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError::Api {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn validation(message: impl Into<String>, details: Value) -> Self {
        ApiError::Api {
            code: ErrorCode::ValidationError,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Api { code, .. } => *code,
            ApiError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Replaces the message of a validation error, keeping its details.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        match self {
            ApiError::Api {
                code: ErrorCode::ValidationError,
                details,
                ..
            } => ApiError::Api {
                code: ErrorCode::ValidationError,
                message: message.into(),
                details,
            },
            other => other,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: ErrorBody,
    metadata: Metadata,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        let body = match self {
            ApiError::Api {
                code,
                message,
                details,
            } => ErrorBody {
                code,
                message,
                details,
            },
            ApiError::Internal(e) => {
                error!(error = ?e, "unhandled internal error");
                ErrorBody {
                    code: ErrorCode::InternalError,
                    message: ErrorCode::InternalError.default_message().to_string(),
                    details: None,
                }
            }
        };
        let envelope = ErrorEnvelope {
            success: false,
            error: body,
            metadata: Metadata::now(),
        };
        (code.status(), Json(envelope)).into_response()
    }
}

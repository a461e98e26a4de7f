//! HTTP error surface.
//!
//! Every handler returns `Result<_, ApiError>`; the `IntoResponse` impl maps
//! variants to status codes and a structured JSON body with a stable machine
//! code. Internal detail is logged server-side and never leaks to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::db::DatabaseError;
use crate::passcode::PasscodeError;
use crate::rag::RagError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid passcode")]
    InvalidPasscode,

    #[error("Forbidden")]
    Forbidden,

    #[error("Share pack has been revoked")]
    Revoked,

    #[error("Share pack has expired")]
    Expired,

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("Share link pepper is not configured")]
    PepperMissing,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidPasscode => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden | ApiError::Revoked | ApiError::Expired => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PepperMissing | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "AUTH_REQUIRED",
            ApiError::InvalidPasscode => "PASSCODE_INVALID",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::Revoked => "PACK_REVOKED",
            ApiError::Expired => "PACK_EXPIRED",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::PepperMissing => "PEPPER_MISSING",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    fn client_message(&self) -> String {
        match self {
            // Hide internal detail; the log line carries it.
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(%detail, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.client_message(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<PasscodeError> for ApiError {
    fn from(err: PasscodeError) -> Self {
        match err {
            PasscodeError::InvalidPepper => ApiError::PepperMissing,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

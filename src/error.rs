//! Error envelope shared by every failing request.
//!
//! Whatever goes wrong inside a handler (bad input, upstream rejection,
//! network failure) ends up as an [`AppError`] and is rendered as:
//!
//! ```json
//! { "success": false, "error": "projectId is required", "code": "MISSING_PROJECT_ID" }
//! ```

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::client::UpstreamError;

pub const MISSING_PARAMETERS: &str = "MISSING_PARAMETERS";
pub const MISSING_PROJECT_ID: &str = "MISSING_PROJECT_ID";
pub const INVALID_PARAMETERS: &str = "INVALID_PARAMETERS";
pub const INVALID_JSON: &str = "INVALID_JSON";
pub const PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
pub const UNKNOWN_CAPABILITY: &str = "UNKNOWN_CAPABILITY";

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    pub code: String,
}

/// Error type returned by route handlers; converts into an HTTP response.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// 400 for input rejected before any upstream call.
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    /// 500 for a failed upstream call.
    ///
    /// The upstream's own error code wins over `default_code`.
    pub fn upstream(err: &UpstreamError, default_code: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            err.code().unwrap_or(default_code),
            err.to_string(),
        )
    }

    pub fn from_body_rejection(rejection: BytesRejection) -> Self {
        let status = rejection.status();
        let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
            PAYLOAD_TOO_LARGE
        } else {
            INVALID_JSON
        };
        Self::new(status, code, rejection.body_text())
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            success: false,
            error: self.message.clone(),
            code: self.code.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = self.envelope();
        (self.status, Json(body)).into_response()
    }
}

//! Mapping of notewise errors onto HTTP responses

use crate::error::NotewiseError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Failure body shared by every route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
    /// Stable taxonomy code
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// HTTP status for each error
pub fn status_for(err: &NotewiseError) -> StatusCode {
    match err {
        NotewiseError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        NotewiseError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        NotewiseError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        NotewiseError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        NotewiseError::Upstream(_)
        | NotewiseError::MalformedResponse { .. }
        | NotewiseError::EmptyResponse(_) => StatusCode::BAD_GATEWAY,
        NotewiseError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a JSON extractor rejection onto `InvalidRequest`
pub fn invalid_body(rejection: JsonRejection) -> NotewiseError {
    debug!("Rejected request body: {}", rejection.body_text());
    NotewiseError::invalid("body", rejection.body_text())
}

/// Error returned from route handlers
#[derive(Debug)]
pub struct ApiError {
    error: NotewiseError,
    with_details: bool,
}

impl ApiError {
    /// Error whose body omits `details`
    pub fn without_details(error: NotewiseError) -> Self {
        Self {
            error,
            with_details: false,
        }
    }

    /// Body that could not be read as the expected JSON shape
    pub fn rejection(rejection: JsonRejection) -> Self {
        Self::from(invalid_body(rejection))
    }

    pub fn inner(&self) -> &NotewiseError {
        &self.error
    }
}

impl From<NotewiseError> for ApiError {
    fn from(error: NotewiseError) -> Self {
        Self {
            error,
            with_details: true,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.error);
        if status.is_server_error() {
            warn!("Request failed ({}): {}", status, self.error);
        } else {
            debug!("Request failed ({}): {}", status, self.error);
        }

        let body = ErrorBody {
            error: self.error.to_string(),
            code: self.error.code().to_string(),
            details: if self.with_details {
                self.error.details()
            } else {
                None
            },
        };
        (status, Json(body)).into_response()
    }
}

//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use snapcam_domain::error::{NotFoundError, SnapcamError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps request and [`SnapcamError`] failures to an HTTP response.
pub enum ApiError {
    Domain(SnapcamError),
    /// The request body could not be read.
    BadRequest(String),
}

impl ApiError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::Domain(SnapcamError::NotFound(NotFoundError {
            entity,
            id: id.into(),
        }))
    }
}

impl From<SnapcamError> for ApiError {
    fn from(err: SnapcamError) -> Self {
        Self::Domain(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Domain(SnapcamError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(SnapcamError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Domain(SnapcamError::Source(err)) => {
                tracing::error!(error = %err, "source error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

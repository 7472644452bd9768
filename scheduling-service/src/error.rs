use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shared::responses::ApiResponse;
use thiserror::Error;

use crate::domain::scheduler::SchedulingError;

/// Application-level errors for the scheduling service.
///
/// Each variant maps to an HTTP status code via the [`IntoResponse`] implementation.
#[derive(Debug, Error)]
pub enum SchedulingServiceError {
    /// Client sent an invalid request.
    #[error("Bad Request: {0}")]
    BadRequest(String),

    /// Request was well-formed but nothing can be done with it.
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// Unexpected internal failure.
    #[error("Internal Server Error: {0}")]
    Internal(String),

    /// The roster engine refused its input.
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

impl IntoResponse for SchedulingServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) | Self::Scheduling(SchedulingError::InvalidPeriod { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unprocessable(_) | Self::Scheduling(SchedulingError::InsufficientStaff) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Internal(_) | Self::Scheduling(SchedulingError::NoCandidate) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, %status, "Server error");
        } else {
            tracing::warn!(error = %self, %status, "Client error");
        }

        let message = match self {
            Self::Internal(_) => "Something went wrong while generating the roster.".to_owned(),
            other => other.to_string(),
        };

        let body = ApiResponse::<()>::err(message);
        (status, axum::Json(body)).into_response()
    }
}

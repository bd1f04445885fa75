use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::dune::DuneError;
use crate::intelligence::InvalidAssumption;
use crate::share::{BuildError, RenderError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Assumption(#[from] InvalidAssumption),

    #[error(transparent)]
    Fetch(#[from] DuneError),

    #[error(transparent)]
    Payload(#[from] BuildError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retryable: Option<bool>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, retryable) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Assumption(e) => (StatusCode::BAD_REQUEST, e.to_string(), None),
            AppError::Payload(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string(), None),
            AppError::Fetch(e) => (
                StatusCode::BAD_GATEWAY,
                e.to_string(),
                Some(e.is_retryable()),
            ),
            AppError::Render(e) => (StatusCode::BAD_GATEWAY, e.to_string(), Some(true)),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                    None,
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
                retryable,
            }),
        )
            .into_response()
    }
}

//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use crate::openai::UpstreamError;

// Errors

/// Everything a handler can fail with before the response starts. Once a
/// relay is streaming, failures travel in-band instead.
#[derive(Debug)]
pub enum ApiError {
    Configuration(String),
    Validation(chat::ValidationError),
    UpstreamRejected { status: StatusCode, body: String },
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Configuration(message) => {
                tracing::error!("{}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message }),
                )
            }
            ApiError::Validation(err) => {
                tracing::debug!("Rejected request: {}", err);
                let mut body = json!({ "error": err.to_string() });
                if let Some(received) = err.received() {
                    body["received"] = received.clone();
                }
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::UpstreamRejected { status, body } => (
                status,
                json!({
                    "error": format!("Upstream API error: {}", status.as_u16()),
                    "details": body,
                }),
            ),
            ApiError::Internal(err) => {
                tracing::error!("{:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "An internal server error occurred.",
                        "details": err.to_string(),
                    }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::MissingCredential => {
                ApiError::Configuration(UpstreamError::MissingCredential.to_string())
            }
            UpstreamError::Rejected { status, body } => ApiError::UpstreamRejected { status, body },
            UpstreamError::Transport(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<chat::ValidationError> for ApiError {
    fn from(err: chat::ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}

pub mod debug {
    pub use crate::api::routes::debug::public::*;
}

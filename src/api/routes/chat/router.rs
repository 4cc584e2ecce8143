//! Router for the chat API

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response, sse::Event, sse::KeepAlive, sse::Sse},
    routing::post,
};
use serde_json::Value;
use tokio_stream::StreamExt as _;

use super::public::{self, ValidationError};
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::api::utils::DetectDisconnect;
use crate::openai::{UpstreamError, extract_event};
use crate::relay::{relay, to_sse_event};

type SharedState = Arc<AppState>;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Relay a completion for the posted conversation as server-sent events
async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    // Configuration problems win over anything wrong with the request
    if !state.upstream.has_credential() {
        return Err(UpstreamError::MissingCredential.into());
    }

    let Json(body) = payload.map_err(|e| ValidationError::Body(e.body_text()))?;
    let messages = public::parse_messages(&body)?;

    tracing::debug!("Relaying {} message(s) upstream", messages.len());
    let upstream = state.upstream.open_stream(&messages).await?;

    let events = relay(upstream, extract_event, state.config.idle_timeout)
        .map(|event| Ok::<Event, Infallible>(to_sse_event(&event)));

    let resp = Sse::new(DetectDisconnect::new(events))
        .keep_alive(
            KeepAlive::default()
                .text("keep-alive")
                .interval(KEEP_ALIVE_INTERVAL),
        )
        .into_response();

    Ok(resp)
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}

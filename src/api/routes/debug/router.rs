//! Router for the diagnostics API

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
    routing::post,
};
use serde_json::Value;

use super::public;
use crate::api::state::AppState;

type SharedState = Arc<AppState>;

/// Echo the request back so a deployment can be checked end to end
/// without calling the provider
async fn echo_handler(
    State(state): State<SharedState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Json<public::EchoResponse> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    // Anything that isn't JSON is echoed as text
    let body = serde_json::from_slice::<Value>(&body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));

    let api_key_length = state.config.api_key.as_ref().map_or(0, String::len);

    Json(public::EchoResponse {
        success: true,
        method: method.to_string(),
        headers,
        body,
        env_vars: public::CredentialStatus {
            api_key_exists: api_key_length > 0,
            api_key_length,
        },
    })
}

/// Create the diagnostics router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(echo_handler))
}

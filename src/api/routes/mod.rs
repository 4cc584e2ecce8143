//! API routes module

pub mod chat;
pub mod debug;

use std::sync::Arc;

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<AppState>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Chat relay
        .nest("/chat", chat::router())
        // Request echo for checking a deployment
        .nest("/debug", debug::router())
}

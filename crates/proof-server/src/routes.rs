//! API route definitions.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::AppState;

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Notes
        .route("/api/deposit/create", post(handlers::create_deposit))
        .route("/api/note/parse", post(handlers::parse_note))
        // Tree and circuit inputs
        .route("/api/merkle/path", post(handlers::merkle_path))
        .route("/api/withdraw/inputs", post(handlers::withdraw_inputs))
}

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::handlers::claims::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Room for two images plus multipart framing.
pub const MAX_REQUEST_BYTES: usize = 2 * MAX_IMAGE_BYTES + 64 * 1024;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(handlers::health::health_check))
        // Claims
        .route("/process-claim/upload", post(handlers::claims::upload_claim))
        .route("/process-claim/pair", post(handlers::claims::process_pair))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
}

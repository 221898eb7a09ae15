use axum::{Router, routing::get};

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

// Liveness only; does not touch the database.
async fn health() -> &'static str {
    "ok"
}

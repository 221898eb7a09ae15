pub mod health;
pub mod subscription;

use axum::Router;

use crate::adapters::http::app_state::AppState;

/// Versioned API routes, mounted under `/api/v1` by `create_app`.
pub fn router() -> Router<AppState> {
    Router::new().merge(subscription::router())
}

use axum::{routing::get, Router};

use opsdesk_backoffice::DbState;

pub mod health;

/// Assemble the full API surface: health probes plus the back-office resources
pub fn create_router(state: DbState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/status", get(health::status_check))
        .nest("/api", opsdesk_backoffice::create_backoffice_router(state))
}

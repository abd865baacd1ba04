pub mod agents;
pub mod auth;
pub mod backups;
pub mod customers;
pub mod dashboard;
pub mod practices;
pub mod providers;
pub mod reminders;

use crate::state::AppState;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub fn create_router(state: Arc<AppState>) -> Router {
    let client_dist = state.config.client_dist.clone();
    let index_html = client_dist.join("index.html");

    Router::new()
        .nest("/api/auth", auth::router())
        .nest("/api/agents", agents::router())
        .nest("/api/providers", providers::router())
        .nest("/api/customers", customers::router())
        .nest("/api/practices", practices::router())
        .nest("/api/reminders", reminders::router())
        .nest("/api/dashboard", dashboard::router())
        .nest("/api/backups", backups::router())
        .fallback_service(
            ServeDir::new(&client_dist)
                .fallback(ServeFile::new(index_html)),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

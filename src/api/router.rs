use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

use super::handlers;

pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render))
        // Reference data
        .route("/api/cohorts", get(handlers::cohorts::list))
        .route("/api/config", get(handlers::config::get_defaults))
        // Wallet reports
        .route("/api/wallets/:address", get(handlers::wallets::report))
        // Projections
        .route("/api/estimates", post(handlers::estimates::create))
        // Share cards
        .route("/api/cards", post(handlers::cards::create));

    // CORS: the dashboard runs on a different origin in development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

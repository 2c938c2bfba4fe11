mod handlers;
mod state;

use axum::Router;
use axum::routing::get;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::discovery::DiscoveryOrchestrator;

pub fn build_router(orchestrator: DiscoveryOrchestrator) -> Router {
    let state = Arc::new(AppState { orchestrator });

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/discover", get(handlers::discover))
        .route("/api/facilities", get(handlers::facilities))
        .route("/api/location", get(handlers::current_location))
        .route("/api/defaults", get(handlers::defaults))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, orchestrator: DiscoveryOrchestrator) {
    let app = build_router(orchestrator);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    eprintln!("  Care Compass server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        });
}

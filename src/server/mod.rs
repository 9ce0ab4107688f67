use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::QueryService;

pub mod routes;

/// Server state
pub struct AppState {
    pub service: QueryService,
}

pub fn router(service: QueryService) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/health", get(routes::health))
        .route("/command", post(routes::run_command))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, service: QueryService) -> anyhow::Result<()> {
    let app = router(service);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

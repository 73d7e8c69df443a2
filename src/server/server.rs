use anyhow::{Context, Result};
use axum::{middleware, routing::post, Router};
use std::net::SocketAddr;
use tracing::{error, info};

use super::http_layers::{authenticate, log_requests};
use super::routes::make_public_routes;
use super::state::ServerState;
use crate::mcp::mcp_handler;

pub fn make_app(state: ServerState) -> Router {
    Router::new()
        .route("/", post(mcp_handler))
        .merge(make_public_routes())
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub async fn run_server(bind_address: SocketAddr, state: ServerState) -> Result<()> {
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

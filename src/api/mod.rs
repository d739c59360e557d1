//! Cart API — Axum JSON surface for the presentation adapters.
//!
//! The sidebar, floating badge, and action menu are pure consumers of
//! this contract: cart contents, derived statistics, validation flags,
//! and the mutators. CORS is enabled for local UI development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use self::routes::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().expect("static origin"))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/api/cart",
            get(routes::get_cart).delete(routes::clear_cart),
        )
        .route("/api/cart/statistics", get(routes::get_statistics))
        .route("/api/cart/validation", get(routes::get_validation))
        .route("/api/cart/slips", post(routes::add_slip))
        .route(
            "/api/cart/slips/:id",
            axum::routing::delete(routes::delete_slip),
        )
        .route("/api/cart/slips/:id/stake", put(routes::update_stake))
        .route("/api/cart/mode", put(routes::set_mode))
        .route("/api/cart/submit", post(routes::submit))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

/// Serve the cart API until the server errors or is shut down.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Cart API listening on http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind API port")?;

    axum::serve(listener, app).await.context("API server error")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

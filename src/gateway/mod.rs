pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

/// Build the full router. Split out from [`run_server`] so gateway tests
/// can drive it without binding a socket.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::status))
        .route("/balance", get(handlers::get_balance))
        // The deployed frontends call this endpoint under several names;
        // all of them are the same flow.
        .route("/api/reward", post(handlers::post_reward))
        .route("/reward", post(handlers::post_reward))
        .route("/sync", post(handlers::post_reward))
        .route("/api/transfer", post(handlers::post_reward))
        .route("/api/transactions", get(handlers::get_transactions))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start the HTTP server. Blocks for the life of the process.
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("❌ FATAL: Failed to bind to {}: {}", addr, e);
            eprintln!(
                "   Hint: Port {} may already be in use. Check with: lsof -i :{}",
                port, port
            );
            std::process::exit(1);
        }
    };

    println!("🚀 Reward server listening on http://{}", addr);
    println!("📖 API Docs: http://{}/docs", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("❌ FATAL: Server error: {}", e);
        std::process::exit(1);
    }
}

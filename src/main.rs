// Define data modules
mod models; // Request/response data structures
mod error;  // Engine failure modes
mod schedule; // Time grid, hour indices, and the scheduling pipeline
mod solver; // Linear program assembly and solving
mod events; // Solution interpretation and event merging
mod routes_schedule; // HTTP handler for the scheduling endpoint

use axum::{routing::post, Router};
use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new().route("/", post(routes_schedule::handle_schedule));

    // Listening port comes from the environment, like the deploy targets
    // expect; anything unset or unparsable falls back to 8000.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind failed");

    axum::serve(listener, app).await.expect("server error");
}

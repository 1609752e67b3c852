mod routes;
mod models;
mod openai;
mod prompt;
mod pipeline;

use axum::{Router, routing::{post, get, delete}};
use routes::{generate_name, create_session, get_session, add_favorite, remove_favorite, AppState};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use std::sync::Arc;
use tower_http::cors::{CorsLayer, Any};

use crate::openai::OpenAiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // A missing credential is fatal at startup, never a per-request error.
    let client = OpenAiClient::from_env()?;
    let state = AppState {
        sessions: Arc::default(),
        service: Arc::new(client),
    };

    let app = Router::new()
        .route("/api/names", post(generate_name))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/favorites", post(add_favorite))
        .route("/api/sessions/:id/favorites/:index", delete(remove_favorite))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state);

    let port: u16 = std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080);
    let addr = SocketAddr::from(([0,0,0,0], port));
    tracing::info!(%addr, "Starting server");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

//! Kiosk - chat-driven payment links, document conversion and image search
//!
//! Serves the tool endpoint a chat host calls with each user message, and the
//! upload/download endpoints behind the links handed out in replies.

mod api;
mod config;
mod convert;
mod lens;
mod links;
mod runtime;
mod state_machine;
mod sweeper;
mod tools;
mod uploads;

use api::{create_router, AppState};
use config::Config;
use lens::{ImgbbClient, LensService, SerpApiClient};
use links::LinkBuilder;
use runtime::{ConversationRuntime, MemoryStateStore, MemoryTokenStore};
use std::net::SocketAddr;
use std::sync::Arc;
use sweeper::Sweeper;
use tools::ToolRegistry;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uploads::{FileStore, UploadTickets};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real environment variables still apply
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiosk=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }

    let config = Config::from_env()?;

    // Stores
    let links = LinkBuilder::new(&config.public_url);
    let tickets = Arc::new(UploadTickets::new(
        Arc::new(MemoryTokenStore::default()),
        links.clone(),
        config.token_ttl,
    ));
    let runtime = Arc::new(ConversationRuntime::new(
        Arc::new(MemoryStateStore::default()),
        tickets.clone(),
    ));

    let files = FileStore::new(&config.upload_dir);
    files.ensure_dir().await?;
    tracing::info!(dir = %config.upload_dir.display(), "Upload directory ready");

    // Image search
    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()?;
    if config.imgbb_api_key.is_none() || config.serpapi_api_key.is_none() {
        tracing::warn!("IMGBB_API_KEY or SERPAPI_API_KEY not set; image search uploads will fail");
    }
    let lens = Arc::new(LensService::new(
        Arc::new(ImgbbClient::new(http.clone(), config.imgbb_api_key.clone())),
        Arc::new(SerpApiClient::new(http, config.serpapi_api_key.clone())),
        config.upstream_timeout,
    ));

    Sweeper::new(tickets.clone(), files.clone(), config.file_retention)
        .spawn(config.sweep_interval);

    let state = AppState {
        runtime,
        tickets,
        files,
        lens,
        tools: Arc::new(ToolRegistry::standard()),
        links,
        auth_token: Arc::from(config.auth_token.as_str()),
        phone_number: Arc::from(config.phone_number.as_str()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(public_url = %config.public_url, "Kiosk server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

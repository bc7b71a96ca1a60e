mod auth;
mod config;
mod credits;
mod errors;
mod gateway;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::credits::CreditLedger;
use crate::gateway::upstream::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CareerForge gateway v{}", env!("CARGO_PKG_VERSION"));

    // Initialize upstream LLM client
    let upstream = GeminiClient::new(&config)?;
    if !upstream.is_configured() {
        info!("GEMINI_API_KEY not set — upstream calls degrade to labeled mock responses");
    }

    // Initialize credit-ledger client
    let ledger = CreditLedger::new(&config)?;
    if config.credit_ledger_url.is_none() {
        info!("CREDIT_LEDGER_URL not set — credit metering is skipped");
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        upstream,
        ledger,
    };

    // Build router (CORS is applied inside build_router so tests cover it)
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// HS256 secret used to verify client bearer tokens.
    pub jwt_secret: String,
    /// Base URL of the credit-ledger debit RPC. Unset skips metering (dev mode).
    pub credit_ledger_url: Option<String>,
    /// Upstream API key. Unset degrades every call to a labeled mock response.
    pub gemini_api_key: Option<String>,
    /// Base URL of the generative-language API.
    pub gemini_base_url: String,
    /// Upstream request timeout in seconds.
    pub upstream_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            jwt_secret: require_env("JWT_SECRET")?,
            credit_ledger_url: optional_env("CREDIT_LEDGER_URL"),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_base_url: std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }),
            upstream_timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse::<u64>()
                .context("UPSTREAM_TIMEOUT_SECS must be a number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Returns `None` for unset or empty variables.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

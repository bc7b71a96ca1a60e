use crate::config::Config;
use crate::credits::CreditLedger;
use crate::gateway::upstream::GeminiClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// The gateway itself is stateless between requests; everything here is a
/// config snapshot or a connection-pooled client.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub upstream: GeminiClient,
    pub ledger: CreditLedger,
}

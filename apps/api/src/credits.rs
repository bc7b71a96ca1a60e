//! Credit gate — debits the external ledger once per gateway request.
//!
//! The ledger is a remote collaborator; the gateway owns no balance state.
//! A denied debit terminates the request before any upstream call. A debit
//! that fails for infrastructure reasons is logged and the request proceeds
//! (fail-open: availability over strict metering).

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;

/// Amount debited per gateway request, regardless of action.
pub const DEBIT_AMOUNT: u32 = 1;

const LEDGER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct DebitRequest {
    user_id: Uuid,
    amount: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    Accepted,
    InsufficientBalance,
}

/// Client for the credit-ledger debit RPC.
#[derive(Clone)]
pub struct CreditLedger {
    client: Client,
    url: Option<String>,
}

impl CreditLedger {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(LEDGER_TIMEOUT)
                .build()
                .context("failed to build ledger HTTP client")?,
            url: config
                .credit_ledger_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_string()),
        })
    }

    /// Debits one credit for `user_id`, applying the fail-open policy.
    /// `Err(InsufficientCredits)` is the only way this stops a request.
    pub async fn charge(&self, user_id: Uuid) -> Result<(), AppError> {
        let Some(url) = &self.url else {
            debug!("no credit ledger configured, skipping debit");
            return Ok(());
        };
        gate(self.debit(url, user_id).await)
    }

    async fn debit(&self, url: &str, user_id: Uuid) -> Result<DebitOutcome> {
        let response = self
            .client
            .post(format!("{url}/debit"))
            .json(&DebitRequest {
                user_id,
                amount: DEBIT_AMOUNT,
            })
            .send()
            .await
            .context("ledger debit request failed")?;

        if response.status() == StatusCode::PAYMENT_REQUIRED {
            return Ok(DebitOutcome::InsufficientBalance);
        }
        response
            .error_for_status()
            .context("ledger debit returned an error status")?;

        Ok(DebitOutcome::Accepted)
    }
}

/// Maps a debit outcome to the request's fate. A denied debit is fatal; a
/// ledger infrastructure failure is logged and waved through (fail-open).
fn gate(outcome: Result<DebitOutcome>) -> Result<(), AppError> {
    match outcome {
        Ok(DebitOutcome::Accepted) => Ok(()),
        Ok(DebitOutcome::InsufficientBalance) => Err(AppError::InsufficientCredits),
        Err(e) => {
            warn!("credit debit failed, proceeding without metering: {e:#}");
            Ok(())
        }
    }
}

//! Upstream Dispatcher — the single point of contact with the
//! generative-language API. Exactly one upstream call is issued per gateway
//! request; nothing here retries.
//!
//! When no API key is configured the dispatcher degrades to clearly labeled
//! mock responses so the rest of the system stays testable without live
//! credentials.

use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use futures::Stream;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Number;
use tracing::error;

use super::analysis::{AnalysisIssue, AtsAnalysis, Severity};
use super::assembler::UpstreamRequest;
use super::Action;
use crate::config::Config;
use crate::errors::AppError;

/// The model used for all gateway calls. Intentionally hardcoded to prevent
/// drift between actions.
pub const MODEL: &str = "gemini-2.0-flash";

/// Placeholder text returned when no upstream credential is configured.
pub const MOCK_NOTICE: &str = "[mock response] GEMINI_API_KEY is not configured; \
    this is placeholder output from the CareerForge gateway.";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    #[serde(default)]
    content: ResponseContent,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// HTTP client for the generative-language endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.upstream_timeout_secs))
                .build()
                .context("failed to build upstream HTTP client")?,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            api_key: config.gemini_api_key.clone(),
        })
    }

    /// False when no credential is configured; callers degrade to mock
    /// responses instead of failing the request.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Single-shot call. Returns the first candidate's concatenated text
    /// (empty when the upstream returned no candidates).
    pub async fn generate(&self, request: &UpstreamRequest) -> Result<String, AppError> {
        let response = self.dispatch("generateContent", request).await?;
        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(anyhow::Error::new(e).context("upstream body")))?;
        Ok(first_candidate_text(body))
    }

    /// Streaming call. Returns the raw byte stream of the upstream's
    /// incrementally emitted JSON array for the transcoder to consume.
    pub async fn stream_generate(
        &self,
        request: &UpstreamRequest,
    ) -> Result<impl Stream<Item = reqwest::Result<Bytes>>, AppError> {
        let response = self.dispatch("streamGenerateContent", request).await?;
        Ok(response.bytes_stream())
    }

    async fn dispatch(
        &self,
        verb: &str,
        request: &UpstreamRequest,
    ) -> Result<reqwest::Response, AppError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("upstream key missing")))?;
        let url = format!("{}/models/{}:{}?key={}", self.base_url, MODEL, verb, key);

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::Error::new(e).context("upstream request failed"))
            })?;

        check_status(response).await
    }
}

/// Maps upstream failure statuses onto the client-facing taxonomy. The
/// upstream error body is logged server-side only.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AppError::UpstreamRateLimited);
    }
    if status == StatusCode::PAYMENT_REQUIRED {
        return Err(AppError::UpstreamQuotaExhausted);
    }
    let body = response.text().await.unwrap_or_default();
    error!("upstream error {status}: {body}");
    Err(AppError::Upstream {
        status: status.as_u16(),
    })
}

fn first_candidate_text(response: GenerateResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect()
        })
        .unwrap_or_default()
}

/// Mock text body for the non-streaming actions.
pub fn mock_text(action: Action) -> String {
    match action {
        Action::Enhance => format!(
            "{MOCK_NOTICE}\n\n1. Enhanced version one.\n2. Enhanced version two.\n3. Enhanced version three."
        ),
        Action::CoverLetter => format!("{MOCK_NOTICE}\n\nDear Hiring Manager,\n\nThis is a placeholder cover letter."),
        _ => MOCK_NOTICE.to_string(),
    }
}

/// Mock analysis payload — valid against the contract so the UI renders it.
pub fn mock_analysis() -> AtsAnalysis {
    AtsAnalysis {
        overall_score: Number::from(70),
        formatting_score: Number::from(70),
        keyword_score: Number::from(65),
        structure_score: Number::from(75),
        content_score: Number::from(70),
        issues: vec![AnalysisIssue {
            title: "Mock analysis".to_string(),
            description: MOCK_NOTICE.to_string(),
            severity: Severity::Info,
        }],
        recommended_keywords: vec![],
        suggestions: vec!["Configure GEMINI_API_KEY to run a real analysis.".to_string()],
    }
}

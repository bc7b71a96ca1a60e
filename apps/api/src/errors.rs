use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Client bodies are always the flat `{"error": string}` shape the web app
/// expects; upstream error bodies are logged server-side and never forwarded.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Insufficient credits")]
    InsufficientCredits,

    #[error("Upstream rate limited")]
    UpstreamRateLimited,

    #[error("Upstream quota exhausted")]
    UpstreamQuotaExhausted,

    #[error("Upstream returned status {status}")]
    Upstream { status: u16 },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AppError::InsufficientCredits => (
                StatusCode::PAYMENT_REQUIRED,
                "Insufficient credits. Please add credits to continue.",
            ),
            AppError::UpstreamRateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limited. Please try again shortly.",
            ),
            AppError::UpstreamQuotaExhausted => (
                StatusCode::PAYMENT_REQUIRED,
                "AI credits exhausted. Please add credits.",
            ),
            AppError::Upstream { status } => {
                tracing::error!("upstream failure (status {status})");
                (StatusCode::INTERNAL_SERVER_ERROR, "AI service error")
            }
            AppError::Internal(e) => {
                tracing::error!("internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred",
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

//! Axum route handler for the AI gateway endpoint.

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    response::{IntoResponse, Response},
    Json,
};
use futures::{stream, Stream, StreamExt};
use serde::Serialize;
use std::future;
use tracing::info;

use super::analysis;
use super::assembler;
use super::transcode::{delta_payload, StreamTranscoder};
use super::upstream;
use super::{Action, AiRequest};
use crate::auth::Principal;
use crate::errors::AppError;
use crate::state::AppState;

/// Body shape for the plain-text actions (enhance, cover-letter).
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: String,
}

/// POST /api/v1/ai
///
/// The gateway endpoint. Authentication happens in the `Principal`
/// extractor; a request that reaches this body has a valid caller. The
/// credit debit runs before any upstream dispatch, so denied debits never
/// consume upstream quota.
pub async fn handle_ai(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<AiRequest>,
) -> Result<Response, AppError> {
    state.ledger.charge(principal.user_id).await?;

    let action = request.action;
    info!(
        user = %principal.user_id,
        email = ?principal.email,
        ?action,
        "gateway request"
    );

    if !state.upstream.is_configured() {
        return Ok(mock_response(action));
    }

    let upstream_request = assembler::assemble(
        action,
        request.resume_data.as_ref(),
        request.job_data.as_ref(),
        &request.messages,
    );

    if action.is_streaming() {
        let bytes = state.upstream.stream_generate(&upstream_request).await?;
        return Ok(sse_from_upstream(bytes).into_response());
    }

    let text = state.upstream.generate(&upstream_request).await?;

    match action {
        Action::Analyze => Ok(Json(analysis::parse_analysis(&text)).into_response()),
        _ => Ok(Json(ContentResponse { content: text }).into_response()),
    }
}

/// Couples the upstream byte stream 1:1 to the outgoing SSE stream. The
/// loop is pull-driven: each client-side poll reads at most one upstream
/// chunk, and dropping the response (client disconnect) drops the upstream
/// body, closing the connection. A mid-stream read error aborts the outgoing
/// stream rather than emitting partial output.
fn sse_from_upstream(
    bytes: impl Stream<Item = reqwest::Result<bytes::Bytes>> + Send + 'static,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let events = bytes
        .scan(StreamTranscoder::new(), |transcoder, read| {
            let out: Vec<Result<Event, axum::Error>> = match read {
                Ok(chunk) => transcoder
                    .push_chunk(&chunk)
                    .into_iter()
                    .map(|text| Ok(Event::default().data(delta_payload(&text))))
                    .collect(),
                Err(e) => vec![Err(axum::Error::new(e))],
            };
            future::ready(Some(stream::iter(out)))
        })
        .flatten();

    Sse::new(events)
}

/// Availability fallback when no upstream credential is configured: every
/// action still answers with its contract shape, clearly labeled as mock.
fn mock_response(action: Action) -> Response {
    match action {
        Action::Chat => {
            let events = stream::iter([Ok::<_, axum::Error>(
                Event::default().data(delta_payload(upstream::MOCK_NOTICE)),
            )]);
            Sse::new(events).into_response()
        }
        Action::Analyze => Json(upstream::mock_analysis()).into_response(),
        _ => Json(ContentResponse {
            content: upstream::mock_text(action),
        })
        .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn chunk(s: &'static str) -> reqwest::Result<bytes::Bytes> {
        Ok(bytes::Bytes::from_static(s.as_bytes()))
    }

    async fn collect_sse(reads: Vec<reqwest::Result<bytes::Bytes>>) -> String {
        let response = sse_from_upstream(stream::iter(reads)).into_response();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[test]
    fn test_content_response_wraps_text_verbatim() {
        let body = serde_json::to_string(&ContentResponse {
            content: "foo".to_string(),
        })
        .unwrap();
        assert_eq!(body, r#"{"content":"foo"}"#);
    }

    #[tokio::test]
    async fn test_sse_framing_and_ordering() {
        let body = collect_sse(vec![
            chunk("[\n"),
            chunk("{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"One \"}]}}]},\n"),
            chunk("{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"two\"}]}}]}\n"),
            chunk("]\n"),
        ])
        .await;

        assert_eq!(
            body,
            "data: {\"choices\":[{\"delta\":{\"content\":\"One \"}}]}\n\n\
             data: {\"choices\":[{\"delta\":{\"content\":\"two\"}}]}\n\n"
        );
    }

    #[tokio::test]
    async fn test_sse_response_content_type() {
        let response = sse_from_upstream(stream::iter(vec![chunk("[\n"), chunk("]\n")]))
            .into_response();
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "text/event-stream"
        );
    }

    #[tokio::test]
    async fn test_mock_chat_is_a_well_formed_sse_stream() {
        let response = mock_response(Action::Chat);
        assert_eq!(
            response.headers()["content-type"].to_str().unwrap(),
            "text/event-stream"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.starts_with("data: {\"choices\":[{\"delta\":{\"content\":"));
        assert!(body.contains("[mock response]"));
        assert!(body.ends_with("\n\n"));
    }
}

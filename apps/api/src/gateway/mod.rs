//! AI Gateway — the single request handler behind the career-tooling UI.
//!
//! Per request: authenticate, debit one credit, assemble the upstream call
//! for the action, then either transcode the upstream stream into SSE deltas
//! (chat) or normalize the response body (analyze / enhance / cover-letter).

pub mod analysis;
pub mod assembler;
pub mod handlers;
pub mod prompts;
pub mod transcode;
pub mod upstream;

use serde::{Deserialize, Serialize};

/// The four supported request modes. Each selects a fixed system prompt
/// template and whether the response streams. Only `Chat` streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Action {
    #[default]
    Chat,
    Analyze,
    Enhance,
    CoverLetter,
}

impl Action {
    /// Parses a wire tag. Unrecognized tags deliberately fall back to `Chat`
    /// so the endpoint behaves as a plain chat coach for callers that omit
    /// or misspell the action.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "analyze" => Action::Analyze,
            "enhance" => Action::Enhance,
            "cover-letter" => Action::CoverLetter,
            _ => Action::Chat,
        }
    }

    pub fn is_streaming(self) -> bool {
        matches!(self, Action::Chat)
    }

    /// Fixed generation temperature per action. Analysis runs cold so the
    /// structured output stays close to the schema.
    pub fn temperature(self) -> f32 {
        match self {
            Action::Analyze => 0.2,
            _ => 0.7,
        }
    }
}

impl From<String> for Action {
    fn from(tag: String) -> Self {
        Action::from_tag(&tag)
    }
}

/// Role vocabulary used by the client conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single turn of client-side conversation history. Passed through
/// unmodified except for role relabeling toward the upstream vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Inbound gateway request body. Every field is optional on the wire;
/// a bare `{}` is a chat request with no history.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiRequest {
    pub action: Action,
    pub messages: Vec<ConversationMessage>,
    pub resume_data: Option<serde_json::Value>,
    pub job_data: Option<serde_json::Value>,
}

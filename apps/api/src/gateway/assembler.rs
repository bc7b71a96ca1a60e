//! Prompt Assembler — builds the ordered upstream request for an action.
//!
//! Message order is fixed: system instruction, then context blocks as
//! standalone user turns (resume before job), then the conversation history
//! relabeled into the upstream role vocabulary.

use serde::Serialize;
use serde_json::Value;

use super::prompts;
use super::{Action, ConversationMessage, MessageRole};

/// A single text part of an upstream content turn.
#[derive(Debug, Serialize)]
pub struct Part {
    pub text: String,
}

/// One content turn in the upstream vocabulary (`user` or `model`).
#[derive(Debug, Serialize)]
pub struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

/// The system instruction block — carries no role.
#[derive(Debug, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

/// Full upstream request body for both `generateContent` and
/// `streamGenerateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamRequest {
    pub system_instruction: SystemInstruction,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

pub fn assemble(
    action: Action,
    resume_data: Option<&Value>,
    job_data: Option<&Value>,
    messages: &[ConversationMessage],
) -> UpstreamRequest {
    let mut contents = Vec::with_capacity(messages.len() + 2);

    if let Some(resume) = resume_data {
        contents.push(user_turn(format!("Resume data:\n{resume}")));
    }
    if let Some(job) = job_data {
        contents.push(user_turn(format!("Job details:\n{job}")));
    }
    for message in messages {
        contents.push(Content {
            role: upstream_role(message.role),
            parts: vec![Part {
                text: message.content.clone(),
            }],
        });
    }

    let analyze = action == Action::Analyze;
    UpstreamRequest {
        system_instruction: SystemInstruction {
            parts: vec![Part {
                text: prompts::system_prompt(action).to_string(),
            }],
        },
        contents,
        generation_config: GenerationConfig {
            temperature: action.temperature(),
            response_mime_type: analyze.then_some("application/json"),
            response_schema: analyze.then(|| prompts::ANALYSIS_RESPONSE_SCHEMA.clone()),
        },
    }
}

fn user_turn(text: String) -> Content {
    Content {
        role: "user",
        parts: vec![Part { text }],
    }
}

fn upstream_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "model",
    }
}

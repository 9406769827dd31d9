//! Chat backend contract.
//!
//! The conversational fallback can be answered by a backend service:
//! `{ utterance, history, page_context, mode }` over HTTP POST, returning
//! `{ message, suggestions?, type?, extracted_data? }`. A reply typed
//! `autonomous_collection` carries `extracted_data` that the engine turns
//! into bulk field updates.
//!
//! The trait keeps the engine testable without a server; the HTTP
//! implementation uses a blocking client to stay inside the engine's
//! single-threaded cooperative model. Ordering of overlapping requests is
//! the engine's job (sequence numbers), not the transport's.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::Result;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One prior turn of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Request body for the chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub utterance: String,
    pub history: Vec<ChatTurn>,
    pub page_context: String,
    pub mode: String,
}

/// Response body from the chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(rename = "type")]
    pub reply_type: Option<String>,
    /// Field key → value, present on `autonomous_collection` replies.
    #[serde(default)]
    pub extracted_data: Option<BTreeMap<String, serde_json::Value>>,
}

/// Reply type that signals a bulk multi-field update.
pub const AUTONOMOUS_COLLECTION: &str = "autonomous_collection";

impl ChatReply {
    /// Bulk field updates carried by an `autonomous_collection` reply,
    /// rendered to strings for the field-update emitter.
    pub fn field_updates(&self) -> Vec<(String, String)> {
        if self.reply_type.as_deref() != Some(AUTONOMOUS_COLLECTION) {
            return Vec::new();
        }
        let Some(data) = &self.extracted_data else {
            return Vec::new();
        };
        data.iter()
            .map(|(key, value)| {
                let rendered = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), rendered)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Backend trait + HTTP implementation
// ---------------------------------------------------------------------------

/// A chat completion backend. Blocking: the calling flow suspends until
/// the reply or the error.
pub trait ChatBackend {
    fn complete(&self, request: &ChatRequest) -> Result<ChatReply>;
}

/// Chat backend over HTTP POST.
pub struct HttpChatBackend {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpChatBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl ChatBackend for HttpChatBackend {
    fn complete(&self, request: &ChatRequest) -> Result<ChatReply> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()?
            .error_for_status()?;
        Ok(response.json::<ChatReply>()?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Request preparer — asks the model to validate a drafted email and annotate
//! the request with channel, priority and a one-line summary.
//!
//! This is the only stage that degrades instead of failing: any call or parse
//! error yields `RequestMetadata` filled with fixed defaults.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, ChatModel, ChatRequest};
use crate::pipeline::models::{CandidateContact, RequestChannel, RequestMetadata, RequestPriority};
use crate::pipeline::prompts::{fill_template, REQUEST_VALIDATION_PROMPT};

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 300;

const FALLBACK_SUMMARY: &str = "Document request for identity verification";
const PARSED_SUMMARY_DEFAULT: &str = "Document request";

/// The validation reply. Every key is read on its own; a missing or
/// mistyped key falls back alone rather than rejecting the whole reply.
#[derive(Debug, Default)]
struct ValidationReply {
    is_valid: Option<bool>,
    request_type: Option<String>,
    priority: Option<String>,
    summary: Option<String>,
}

impl ValidationReply {
    fn from_object(object: &Map<String, Value>) -> Self {
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            is_valid: object.get("is_valid").and_then(lenient_bool),
            request_type: text("request_type"),
            priority: text("priority"),
            summary: text("summary"),
        }
    }
}

/// Accepts `true`/`false` as JSON booleans or as strings.
fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub struct RequestPreparer {
    model: Arc<dyn ChatModel>,
}

impl RequestPreparer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn prepare_request(
        &self,
        contact: &CandidateContact,
        email_content: &str,
    ) -> RequestMetadata {
        match self.validate(contact, email_content).await {
            Ok(reply) => {
                info!("Request metadata prepared by model");
                from_reply(contact, email_content, reply)
            }
            Err(reason) => {
                warn!("Request validation unavailable ({reason}); using defaults");
                fallback_metadata(contact, email_content)
            }
        }
    }

    async fn validate(
        &self,
        contact: &CandidateContact,
        email_content: &str,
    ) -> Result<ValidationReply, String> {
        let prompt = fill_template(
            REQUEST_VALIDATION_PROMPT,
            &[
                ("name", contact.full_name.as_deref().unwrap_or("Candidate")),
                ("email", contact.email.as_deref().unwrap_or("")),
                ("phone", contact.phone.as_deref().unwrap_or("")),
                ("email_content", email_content),
            ],
        );

        let raw = self
            .model
            .complete(ChatRequest {
                system: JSON_ONLY_SYSTEM,
                user: &prompt,
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            })
            .await
            .map_err(|e| e.to_string())?;

        let reply: Value = serde_json::from_str(strip_json_fences(&raw)).map_err(|e| e.to_string())?;
        reply
            .as_object()
            .map(ValidationReply::from_object)
            .ok_or_else(|| "reply is not a JSON object".to_string())
    }
}

fn from_reply(
    contact: &CandidateContact,
    email_content: &str,
    reply: ValidationReply,
) -> RequestMetadata {
    RequestMetadata {
        candidate_email: contact.email.clone(),
        candidate_phone: contact.phone.clone(),
        message: email_content.to_string(),
        request_type: reply
            .request_type
            .as_deref()
            .and_then(RequestChannel::parse)
            .unwrap_or_default(),
        priority: reply
            .priority
            .as_deref()
            .and_then(RequestPriority::parse)
            .unwrap_or_default(),
        summary: reply
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| PARSED_SUMMARY_DEFAULT.to_string()),
        is_valid: reply.is_valid.unwrap_or(true),
    }
}

/// Metadata used when the validation call fails or its reply does not parse.
pub fn fallback_metadata(contact: &CandidateContact, email_content: &str) -> RequestMetadata {
    RequestMetadata {
        candidate_email: contact.email.clone(),
        candidate_phone: contact.phone.clone(),
        message: email_content.to_string(),
        request_type: RequestChannel::Email,
        priority: RequestPriority::Medium,
        summary: FALLBACK_SUMMARY.to_string(),
        is_valid: true,
    }
}

//! Structured extraction — asks the model for the candidate schema and parses its reply.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::llm_client::{strip_json_fences, ChatModel, ChatRequest};
use crate::pipeline::prompts::{fill_template, RESUME_EXTRACTION_PROMPT, RESUME_EXTRACTION_SYSTEM};
use crate::pipeline::PipelineError;

/// Low temperature keeps the extraction factual.
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 1500;

pub struct ResumeChecker {
    model: Arc<dyn ChatModel>,
}

impl ResumeChecker {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Returns the model's JSON reply, parsed but not shape-checked.
    /// Shape enforcement is `normalizer::normalize`'s job.
    pub async fn extract_information(&self, resume_text: &str) -> Result<Value, PipelineError> {
        let prompt = fill_template(RESUME_EXTRACTION_PROMPT, &[("resume_text", resume_text)]);

        let raw = self
            .model
            .complete(ChatRequest {
                system: RESUME_EXTRACTION_SYSTEM,
                user: &prompt,
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            })
            .await
            .map_err(|source| PipelineError::ModelInvocationFailed {
                stage: "resume_extraction",
                source,
            })?;

        debug!("Resume extraction reply: {} chars", raw.len());
        parse_model_json(&raw)
    }
}

/// Fence-strips and parses a model reply, keeping the raw text on failure.
pub fn parse_model_json(raw: &str) -> Result<Value, PipelineError> {
    serde_json::from_str(strip_json_fences(raw)).map_err(|source| {
        warn!("Model reply is not valid JSON: {source}");
        PipelineError::ResponseParseFailed {
            source,
            raw: raw.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;
    use serde_json::json;

    #[test]
    fn test_parse_model_json_strips_fence() {
        let value = parse_model_json("```json\n{\"a\":1}\n```").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_parse_model_json_keeps_raw_text_on_failure() {
        let raw = "{\"full_name\": {\"value\": \"x\", \"confidence\": 0.9},}";
        match parse_model_json(raw) {
            Err(PipelineError::ResponseParseFailed { raw: kept, .. }) => assert_eq!(kept, raw),
            other => panic!("expected ResponseParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_model_json_accepts_non_object_json() {
        assert_eq!(parse_model_json("[1, 2]").unwrap(), json!([1, 2]));
    }

    #[tokio::test]
    async fn test_prompt_embeds_resume_text_verbatim() {
        let model = Arc::new(ScriptedModel::new().with_reply("{}"));
        let checker = ResumeChecker::new(model.clone());
        let resume = "Jane Roe\n{not a placeholder}\nRust & Go";

        checker.extract_information(resume).await.unwrap();

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].user.contains(resume));
        assert!((calls[0].temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(calls[0].max_tokens, 1500);
    }

    #[tokio::test]
    async fn test_model_failure_is_invocation_error() {
        let model = Arc::new(ScriptedModel::new().with_failure(401, "invalid api key"));
        let checker = ResumeChecker::new(model);

        let err = checker.extract_information("resume").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ModelInvocationFailed {
                stage: "resume_extraction",
                ..
            }
        ));
    }
}

// Resume pipeline: structured extraction, normalization, correspondence, request metadata.
// All LLM calls go through llm_client::ChatModel; no stage talks to the API directly.

use thiserror::Error;

use crate::llm_client::LlmError;

pub mod email_writer;
pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
pub mod request_preparer;
pub mod resume_checker;

/// Failures a pipeline stage can surface to its caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} model call failed: {source}")]
    ModelInvocationFailed {
        stage: &'static str,
        #[source]
        source: LlmError,
    },

    #[error("Failed to parse model response as JSON: {source}")]
    ResponseParseFailed {
        #[source]
        source: serde_json::Error,
        /// The reply exactly as the model sent it.
        raw: String,
    },
}

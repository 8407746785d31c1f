//! Document pipeline — sequences the stages for one uploaded resume.
//!
//! Flow: ResumeChecker → normalize → EmailWriter → RequestPreparer.
//!
//! Stages run strictly in order. A failure in extraction or email generation
//! fails the whole run with no partial result; the request-metadata stage
//! degrades to defaults instead.

use std::sync::Arc;

use tracing::info;

use crate::llm_client::ChatModel;
use crate::pipeline::email_writer::EmailWriter;
use crate::pipeline::models::{CandidateContact, PipelineResult};
use crate::pipeline::normalizer::normalize;
use crate::pipeline::request_preparer::RequestPreparer;
use crate::pipeline::resume_checker::ResumeChecker;
use crate::pipeline::PipelineError;

/// Holds no state across runs; each `run` is independent.
pub struct DocumentPipeline {
    resume_checker: ResumeChecker,
    email_writer: EmailWriter,
    request_preparer: RequestPreparer,
}

impl DocumentPipeline {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            resume_checker: ResumeChecker::new(model.clone()),
            email_writer: EmailWriter::new(model.clone()),
            request_preparer: RequestPreparer::new(model),
        }
    }

    pub async fn run(&self, resume_text: &str) -> Result<PipelineResult, PipelineError> {
        info!("Step 1: extracting candidate information");
        let raw = self.resume_checker.extract_information(resume_text).await?;
        let extracted_data = normalize(&raw);

        info!("Step 2: drafting document request email");
        let contact = CandidateContact::from(&extracted_data);
        let request_message = self.email_writer.generate_request_email(&contact).await?;

        info!("Step 3: preparing request metadata");
        let request_metadata = self
            .request_preparer
            .prepare_request(&contact, &request_message)
            .await;

        info!("Pipeline completed");
        Ok(PipelineResult {
            extracted_data,
            request_message,
            request_metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;
    use crate::pipeline::models::{ExtractedField, FieldValue, RequestChannel, RequestPriority};
    use serde_json::json;

    const JOHN_DOE_RESUME: &str = "John Doe, Software Engineer at Acme Corp, john@acme.com, \
        5 years experience, skills: Python, Go";

    const JOHN_DOE_REPLY: &str = r#"```json
{
  "full_name": {"value": "John Doe", "confidence": 0.97},
  "email": {"value": "john@acme.com", "confidence": 0.99},
  "phone": {"value": null, "confidence": 0},
  "current_company": {"value": "Acme Corp", "confidence": 0.93},
  "designation": {"value": "Software Engineer", "confidence": 0.9},
  "skills": {"value": ["Python", "Go"], "confidence": 0.88},
  "years_of_experience": 5,
  "education": null
}
```"#;

    const EMAIL: &str = "Subject: Identity Documents Required\n\nDear John Doe,\n\n...\n\nBest regards,\nHR";

    #[tokio::test]
    async fn test_john_doe_end_to_end() {
        let model = Arc::new(
            ScriptedModel::new()
                .with_reply(JOHN_DOE_REPLY)
                .with_reply(EMAIL)
                .with_reply(r#"{"is_valid": true, "request_type": "email", "priority": "high", "summary": "PAN and Aadhaar for John Doe"}"#),
        );
        let pipeline = DocumentPipeline::new(model.clone());

        let result = pipeline.run(JOHN_DOE_RESUME).await.unwrap();

        let info = &result.extracted_data;
        assert_eq!(info.full_name.value, FieldValue::Text("John Doe".to_string()));
        assert_eq!(info.current_company.value, FieldValue::Text("Acme Corp".to_string()));
        assert_eq!(info.years_of_experience_as_i32(), Some(5));
        let skills = info.skills_list();
        assert!(skills.contains(&"Python".to_string()));
        assert!(skills.contains(&"Go".to_string()));

        assert_eq!(result.request_message, EMAIL);
        assert_eq!(result.request_metadata.priority, RequestPriority::High);

        let calls = model.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].user.contains(JOHN_DOE_RESUME));
        assert!(calls[1].user.contains("- Name: John Doe"));
        assert!(calls[1].user.contains("- Company: Acme Corp"));
        // Null phone is unwrapped to the empty default.
        assert!(calls[1].user.contains("- Phone: \n"));
        assert!(calls[2].user.contains(EMAIL));
    }

    #[tokio::test]
    async fn test_empty_resume_produces_complete_defaults() {
        let model = Arc::new(ScriptedModel::new().with_reply("{}").with_reply(EMAIL).with_reply("{}"));
        let pipeline = DocumentPipeline::new(model.clone());

        let result = pipeline.run("").await.unwrap();

        let info = &result.extracted_data;
        for field in [
            &info.full_name,
            &info.email,
            &info.phone,
            &info.current_company,
            &info.designation,
        ] {
            assert_eq!(field, &ExtractedField::empty());
        }
        assert_eq!(info.skills, ExtractedField::empty_list());
        assert!(info.years_of_experience.is_null());
        assert!(info.education.is_null());
        assert!(model.calls()[1].user.contains("- Name: Candidate"));
    }

    #[tokio::test]
    async fn test_malformed_json_fails_without_drafting_email() {
        let model = Arc::new(
            ScriptedModel::new()
                .with_reply(r#"{"full_name": {"value": "John Doe", "confidence": 0.9},}"#)
                .with_reply(EMAIL),
        );
        let pipeline = DocumentPipeline::new(model.clone());

        let err = pipeline.run(JOHN_DOE_RESUME).await.unwrap_err();

        assert!(matches!(err, PipelineError::ResponseParseFailed { .. }));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_extraction_model_failure_aborts_pipeline() {
        let model = Arc::new(ScriptedModel::new().with_failure(503, "unavailable"));
        let pipeline = DocumentPipeline::new(model.clone());

        let err = pipeline.run(JOHN_DOE_RESUME).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::ModelInvocationFailed {
                stage: "resume_extraction",
                ..
            }
        ));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_email_failure_fails_pipeline() {
        let model = Arc::new(
            ScriptedModel::new()
                .with_reply(JOHN_DOE_REPLY)
                .with_failure(429, "quota exceeded"),
        );
        let pipeline = DocumentPipeline::new(model.clone());

        let err = pipeline.run(JOHN_DOE_RESUME).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::ModelInvocationFailed {
                stage: "email_generation",
                ..
            }
        ));
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_metadata_failure_still_succeeds_with_defaults() {
        let model = Arc::new(
            ScriptedModel::new()
                .with_reply(JOHN_DOE_REPLY)
                .with_reply(EMAIL)
                .with_failure(500, "validation model crashed"),
        );
        let pipeline = DocumentPipeline::new(model);

        let result = pipeline.run(JOHN_DOE_RESUME).await.unwrap();

        let metadata = &result.request_metadata;
        assert_eq!(metadata.request_type, RequestChannel::Email);
        assert_eq!(metadata.priority, RequestPriority::Medium);
        assert_eq!(metadata.summary, "Document request for identity verification");
        assert!(metadata.is_valid);
        assert_eq!(metadata.candidate_email.as_deref(), Some("john@acme.com"));
    }

    #[tokio::test]
    async fn test_result_serializes_to_public_shape() {
        let model = Arc::new(ScriptedModel::new().with_reply("{}").with_reply(EMAIL));
        let result = DocumentPipeline::new(model).run("text").await.unwrap();

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["request_message"], json!(EMAIL));
        assert_eq!(value["request_metadata"]["request_type"], json!("email"));
        assert_eq!(value["extracted_data"]["full_name"]["value"], json!(null));
    }
}

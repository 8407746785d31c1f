//! Correspondence generator — drafts the PAN/Aadhaar document-request email.

use std::sync::Arc;

use tracing::info;

use crate::llm_client::{ChatModel, ChatRequest};
use crate::pipeline::models::CandidateContact;
use crate::pipeline::prompts::{fill_template, EMAIL_WRITER_PROMPT, EMAIL_WRITER_SYSTEM};
use crate::pipeline::PipelineError;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 500;

pub struct EmailWriter {
    model: Arc<dyn ChatModel>,
}

impl EmailWriter {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Returns the drafted email as raw text: a `Subject:` line, a blank
    /// line, then the body. Subject and body are not split here.
    pub async fn generate_request_email(
        &self,
        contact: &CandidateContact,
    ) -> Result<String, PipelineError> {
        let prompt = build_email_prompt(contact);

        let email = self
            .model
            .complete(ChatRequest {
                system: EMAIL_WRITER_SYSTEM,
                user: &prompt,
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            })
            .await
            .map_err(|source| PipelineError::ModelInvocationFailed {
                stage: "email_generation",
                source,
            })?;

        info!("Drafted document request email ({} chars)", email.len());
        Ok(email.trim().to_string())
    }
}

fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

fn build_email_prompt(contact: &CandidateContact) -> String {
    fill_template(
        EMAIL_WRITER_PROMPT,
        &[
            ("name", or_default(&contact.full_name, "Candidate")),
            ("email", or_default(&contact.email, "")),
            ("phone", or_default(&contact.phone, "")),
            ("company", or_default(&contact.current_company, "our organization")),
            ("designation", or_default(&contact.designation, "the position")),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    #[test]
    fn test_prompt_uses_defaults_for_missing_values() {
        let prompt = build_email_prompt(&CandidateContact {
            full_name: Some("   ".to_string()),
            ..Default::default()
        });
        assert!(prompt.contains("- Name: Candidate\n"));
        assert!(prompt.contains("- Email: \n"));
        assert!(prompt.contains("- Phone: \n"));
        assert!(prompt.contains("- Company: our organization\n"));
        assert!(prompt.contains("- Designation: the position\n"));
    }

    #[test]
    fn test_prompt_uses_contact_values() {
        let prompt = build_email_prompt(&CandidateContact {
            full_name: Some("John Doe".to_string()),
            email: Some("john@acme.com".to_string()),
            phone: Some("+91-9876543210".to_string()),
            current_company: Some("Acme Corp".to_string()),
            designation: Some("Software Engineer".to_string()),
        });
        assert!(prompt.contains("- Name: John Doe"));
        assert!(prompt.contains("- Company: Acme Corp"));
        assert!(prompt.contains("PAN Card and Aadhaar Card"));
        assert!(!prompt.contains("{name}"));
    }

    #[test]
    fn test_placeholder_text_in_values_is_kept_verbatim() {
        let prompt = build_email_prompt(&CandidateContact {
            full_name: Some("Jo {company}".to_string()),
            current_company: Some("Acme Corp".to_string()),
            ..Default::default()
        });
        assert!(prompt.contains("- Name: Jo {company}\n"));
        assert!(prompt.contains("- Company: Acme Corp\n"));
    }

    #[tokio::test]
    async fn test_generated_email_is_trimmed() {
        let model = Arc::new(
            ScriptedModel::new().with_reply("\n Subject: Documents Required\n\nDear John,\n\nHR \n"),
        );
        let writer = EmailWriter::new(model.clone());

        let email = writer
            .generate_request_email(&CandidateContact::default())
            .await
            .unwrap();

        assert_eq!(email, "Subject: Documents Required\n\nDear John,\n\nHR");
        let call = &model.calls()[0];
        assert!((call.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(call.max_tokens, 500);
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let model = Arc::new(ScriptedModel::new().with_failure(429, "quota exceeded"));
        let writer = EmailWriter::new(model);

        let err = writer
            .generate_request_email(&CandidateContact::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ModelInvocationFailed {
                stage: "email_generation",
                ..
            }
        ));
    }
}

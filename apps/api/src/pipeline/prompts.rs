// Resume pipeline LLM prompt templates.
// All prompts for the pipeline module are defined here.

use std::sync::OnceLock;

use regex::{Captures, Regex};

pub const RESUME_EXTRACTION_SYSTEM: &str = "\
You are an expert HR assistant specialized in resume analysis and information extraction. \
Extract only what the resume states; never guess or invent values.";

pub const RESUME_EXTRACTION_PROMPT: &str = r#"Analyze the resume below and extract key information. Return ONLY a valid JSON object in this exact format:

{
  "full_name": {"value": "John Doe", "confidence": 0.95},
  "email": {"value": "john@example.com", "confidence": 0.99},
  "phone": {"value": "+91-9876543210", "confidence": 0.95},
  "current_company": {"value": "Tech Corp", "confidence": 0.92},
  "designation": {"value": "Senior Software Engineer", "confidence": 0.90},
  "skills": {"value": ["Python", "React", "AWS"], "confidence": 0.88},
  "years_of_experience": 5,
  "education": "B.Tech Computer Science"
}

RULES:
1. current_company is the most recent employer; designation is the current job title
2. skills.value must be an array of strings
3. years_of_experience is the total as a bare number, or null
4. education is the highest degree as a bare string, or null
5. Confidence scores are numbers between 0 and 1
6. If a field is not found, set value to null and confidence to 0
7. Return ONLY the JSON object, no other text

RESUME TEXT:
{resume_text}"#;

pub const EMAIL_WRITER_SYSTEM: &str = "\
You are a professional HR communication specialist helping collect identity documents from candidates.";

pub const EMAIL_WRITER_PROMPT: &str = r#"Write a polite, professional email requesting identity documents from a candidate.

Candidate Information:
- Name: {name}
- Email: {email}
- Phone: {phone}
- Company: {company}
- Designation: {designation}

Requirements:
1. Start with a professional subject line
2. Address the candidate by name
3. Mention that we need some documents for further processing
4. Clearly state that you need their PAN Card and Aadhaar Card
5. Explain that these are required for verification purposes
6. Provide clear instructions on how to submit (via email reply or the upload portal)
7. Maintain a warm, friendly yet professional tone
8. Keep it concise (3-4 paragraphs)
9. Close professionally, signed "HR"

Format:
Subject: [subject line]

[Email body]

Write the complete email now:"#;

pub const REQUEST_VALIDATION_PROMPT: &str = r#"You are validating and preparing a document request.

Candidate Information:
- Name: {name}
- Email: {email}
- Phone: {phone}

Email Content:
{email_content}

Your task:
1. Verify the email is professional and appropriate
2. Confirm it includes clear instructions
3. Check that the required documents (PAN, Aadhaar) are mentioned
4. Return a JSON object with exactly these keys:
{
  "is_valid": true,
  "request_type": "email" | "sms",
  "priority": "high" | "medium" | "low",
  "summary": "One-line summary of the request"
}"#;

fn placeholder_pattern() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"))
}

/// Substitutes `{key}` placeholders in one pass. Substituted text is never
/// rescanned, and unknown placeholders are left as written.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_does_not_rescan_values() {
        let filled = fill_template(
            "Name: {name}, Company: {company}",
            &[("name", "Jo {company}"), ("company", "Acme")],
        );
        assert_eq!(filled, "Name: Jo {company}, Company: Acme");
    }

    #[test]
    fn test_fill_template_keeps_unknown_placeholders_and_json() {
        let filled = fill_template(r#"{"a": 1} {missing} {name}"#, &[("name", "x")]);
        assert_eq!(filled, r#"{"a": 1} {missing} x"#);
    }
}

//! Data shapes flowing through the resume pipeline.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// The value half of an `ExtractedField`. Anything the model returns that is
/// not null, a string, a number or a list of strings is kept verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Text(String),
    Number(Number),
    List(Vec<String>),
    Other(Value),
}

impl FieldValue {
    /// Plain-string view used when flattening fields for correspondence.
    /// Empty strings count as absent.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) if !s.trim().is_empty() => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// One piece of information pulled from a resume together with the model's
/// self-reported certainty. Confidence is nominally in [0, 1] but is never
/// clamped; out-of-range values pass through as the model sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    #[serde(default)]
    pub value: FieldValue,
    #[serde(default, deserialize_with = "confidence_or_zero")]
    pub confidence: f64,
    /// Sub-keys beyond `value`/`confidence` are carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `null` confidence reads as 0. Non-numeric values still fail to decode.
fn confidence_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl ExtractedField {
    pub fn empty() -> Self {
        Self {
            value: FieldValue::Null,
            confidence: 0.0,
            extra: Map::new(),
        }
    }

    pub fn empty_list() -> Self {
        Self {
            value: FieldValue::List(Vec::new()),
            confidence: 0.0,
            extra: Map::new(),
        }
    }
}

/// Schema-complete candidate information. Every wrapped field is always
/// present; `years_of_experience` and `education` are the model's raw values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCandidateInfo {
    pub full_name: ExtractedField,
    pub email: ExtractedField,
    pub phone: ExtractedField,
    pub current_company: ExtractedField,
    pub designation: ExtractedField,
    pub skills: ExtractedField,
    pub years_of_experience: Value,
    pub education: Value,
}

impl NormalizedCandidateInfo {
    /// Whole years, when the model gave a number (or a numeric string).
    pub fn years_of_experience_as_i32(&self) -> Option<i32> {
        match &self.years_of_experience {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.round() as i64))
                .and_then(|v| i32::try_from(v).ok()),
            Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i32),
            _ => None,
        }
    }

    /// Education as text. The model occasionally wraps it as `{value, confidence}`.
    pub fn education_text(&self) -> Option<String> {
        match &self.education {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.get("value").and_then(Value::as_str).map(String::from),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn skills_list(&self) -> Vec<String> {
        self.skills.value.as_list().map(<[String]>::to_vec).unwrap_or_default()
    }
}

/// The flat identity/position map handed to the email writer. Values are
/// already unwrapped from `ExtractedField.value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateContact {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub current_company: Option<String>,
    pub designation: Option<String>,
}

impl From<&NormalizedCandidateInfo> for CandidateContact {
    fn from(info: &NormalizedCandidateInfo) -> Self {
        Self {
            full_name: info.full_name.value.as_text(),
            email: info.email.value.as_text(),
            phone: info.phone.value.as_text(),
            current_company: info.current_company.value.as_text(),
            designation: info.designation.value.as_text(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestChannel {
    #[default]
    Email,
    Sms,
}

impl RequestChannel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "email" => Some(RequestChannel::Email),
            "sms" => Some(RequestChannel::Sms),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestChannel::Email => "email",
            RequestChannel::Sms => "sms",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl RequestPriority {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "high" => Some(RequestPriority::High),
            "medium" => Some(RequestPriority::Medium),
            "low" => Some(RequestPriority::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPriority::High => "high",
            RequestPriority::Medium => "medium",
            RequestPriority::Low => "low",
        }
    }
}

/// Annotation attached to a drafted document request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub candidate_email: Option<String>,
    pub candidate_phone: Option<String>,
    pub message: String,
    pub request_type: RequestChannel,
    pub priority: RequestPriority,
    pub summary: String,
    pub is_valid: bool,
}

/// Output of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub extracted_data: NormalizedCandidateInfo,
    pub request_message: String,
    pub request_metadata: RequestMetadata,
}

/// Returns the text after a leading `Subject:` line, if the email has one.
pub fn subject_line(email: &str) -> Option<&str> {
    email
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| {
            line.strip_prefix("Subject:")
                .or_else(|| line.strip_prefix("subject:"))
                .or_else(|| line.strip_prefix("**Subject:**"))
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of resume processing for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ExtractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Pending => "pending",
            ExtractionStatus::Processing => "processing",
            ExtractionStatus::Completed => "completed",
            ExtractionStatus::Failed => "failed",
        }
    }
}

/// Identity documents a candidate may submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pan,
    Aadhaar,
}

impl DocumentType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "pan" => Some(DocumentType::Pan),
            "aadhaar" => Some(DocumentType::Aadhaar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Pan => "pan",
            DocumentType::Aadhaar => "aadhaar",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub resume_filename: String,
    pub upload_date: DateTime<Utc>,
    pub extraction_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExtractedDataRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub full_name: Option<String>,
    pub full_name_confidence: Option<f64>,
    pub email: Option<String>,
    pub email_confidence: Option<f64>,
    pub phone: Option<String>,
    pub phone_confidence: Option<f64>,
    pub current_company: Option<String>,
    pub current_company_confidence: Option<f64>,
    pub designation: Option<String>,
    pub designation_confidence: Option<f64>,
    pub skills: Value,
    pub skills_confidence: Option<f64>,
    pub years_of_experience: Option<i32>,
    pub education: Option<String>,
    pub raw_extracted_data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExtractedDataRow {
    /// API view: each field wrapped as `{value, confidence}`, like the pipeline output.
    pub fn to_view(&self) -> Value {
        let skills = if self.skills.is_array() {
            self.skills.clone()
        } else {
            json!([])
        };
        json!({
            "id": self.id,
            "candidate_id": self.candidate_id,
            "full_name": {"value": self.full_name, "confidence": self.full_name_confidence},
            "email": {"value": self.email, "confidence": self.email_confidence},
            "phone": {"value": self.phone, "confidence": self.phone_confidence},
            "current_company": {"value": self.current_company, "confidence": self.current_company_confidence},
            "designation": {"value": self.designation, "confidence": self.designation_confidence},
            "skills": {"value": skills, "confidence": self.skills_confidence},
            "years_of_experience": self.years_of_experience,
            "education": self.education,
            "created_at": self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRequestRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub request_type: String,
    pub request_message: String,
    pub request_status: String,
    pub priority: Option<String>,
    pub summary: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubmittedDocumentRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub document_type: String,
    #[serde(skip_serializing)]
    pub document_path: String,
    pub document_filename: String,
    pub file_size: Option<i64>,
    pub submitted_at: DateTime<Utc>,
    pub verification_status: String,
    pub created_at: DateTime<Utc>,
}

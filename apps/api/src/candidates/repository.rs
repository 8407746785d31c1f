//! Candidate persistence. Plain runtime-checked sqlx queries against Postgres.

use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::candidate::{
    CandidateRow, DocumentRequestRow, DocumentType, ExtractedDataRow, ExtractionStatus,
    SubmittedDocumentRow,
};
use crate::pipeline::models::{NormalizedCandidateInfo, RequestMetadata};
use crate::storage::StoredFile;

/// A candidate row joined with the headline extracted fields, for listings.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct CandidateListRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub candidate: CandidateRow,
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
}

pub async fn insert_candidate(
    pool: &PgPool,
    resume: &StoredFile,
    status: ExtractionStatus,
) -> Result<CandidateRow, sqlx::Error> {
    let row = sqlx::query_as::<_, CandidateRow>(
        r#"
        INSERT INTO candidates (id, resume_filename, resume_path, extraction_status)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&resume.filename)
    .bind(resume.path.to_string_lossy().as_ref())
    .bind(status.as_str())
    .fetch_one(pool)
    .await?;

    info!("Created candidate {} for {}", row.id, row.resume_filename);
    Ok(row)
}

pub async fn set_extraction_status(
    pool: &PgPool,
    candidate_id: Uuid,
    status: ExtractionStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE candidates SET extraction_status = $1, updated_at = NOW() WHERE id = $2")
        .bind(status.as_str())
        .bind(candidate_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Stores the normalized extraction and marks the candidate completed in one transaction.
pub async fn save_extracted_data(
    pool: &PgPool,
    candidate_id: Uuid,
    info: &NormalizedCandidateInfo,
) -> Result<(), sqlx::Error> {
    let raw = serde_json::to_value(info).unwrap_or_else(|_| json!({}));
    let skills = json!(info.skills_list());

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO extracted_data
            (id, candidate_id,
             full_name, full_name_confidence, email, email_confidence,
             phone, phone_confidence, current_company, current_company_confidence,
             designation, designation_confidence, skills, skills_confidence,
             years_of_experience, education, raw_extracted_data)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(candidate_id)
    .bind(info.full_name.value.as_text())
    .bind(info.full_name.confidence)
    .bind(info.email.value.as_text())
    .bind(info.email.confidence)
    .bind(info.phone.value.as_text())
    .bind(info.phone.confidence)
    .bind(info.current_company.value.as_text())
    .bind(info.current_company.confidence)
    .bind(info.designation.value.as_text())
    .bind(info.designation.confidence)
    .bind(&skills)
    .bind(info.skills.confidence)
    .bind(info.years_of_experience_as_i32())
    .bind(info.education_text())
    .bind(&raw)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE candidates SET extraction_status = $1, updated_at = NOW() WHERE id = $2")
        .bind(ExtractionStatus::Completed.as_str())
        .bind(candidate_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    info!("Stored extracted data for candidate {candidate_id}");
    Ok(())
}

pub async fn get_candidate(pool: &PgPool, candidate_id: Uuid) -> Result<Option<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
        .bind(candidate_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_extracted_data(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Option<ExtractedDataRow>, sqlx::Error> {
    sqlx::query_as::<_, ExtractedDataRow>("SELECT * FROM extracted_data WHERE candidate_id = $1")
        .bind(candidate_id)
        .fetch_optional(pool)
        .await
}

/// One page of candidates, newest upload first, plus the total matching count.
pub async fn list_candidates(
    pool: &PgPool,
    status: Option<&str>,
    page: i64,
    limit: i64,
) -> Result<(Vec<CandidateListRow>, i64), sqlx::Error> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM candidates WHERE ($1::TEXT IS NULL OR extraction_status = $1)",
    )
    .bind(status)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query_as::<_, CandidateListRow>(
        r#"
        SELECT c.*, e.full_name AS name, e.email AS email, e.current_company AS company
        FROM candidates c
        LEFT JOIN extracted_data e ON e.candidate_id = c.id
        WHERE ($1::TEXT IS NULL OR c.extraction_status = $1)
        ORDER BY c.upload_date DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(status)
    .bind(limit)
    .bind(page_offset(page, limit))
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

/// Row offset for a 1-based page. Saturates so huge page numbers yield an empty page.
fn page_offset(page: i64, limit: i64) -> i64 {
    page.max(1).saturating_sub(1).saturating_mul(limit.max(0))
}

pub async fn insert_document_request(
    pool: &PgPool,
    candidate_id: Uuid,
    message: &str,
    status: &str,
    metadata: Option<&RequestMetadata>,
) -> Result<DocumentRequestRow, sqlx::Error> {
    let request_type = metadata.map_or("email", |m| m.request_type.as_str());
    let priority = metadata.map(|m| m.priority.as_str());
    let summary = metadata.map(|m| m.summary.as_str());

    sqlx::query_as::<_, DocumentRequestRow>(
        r#"
        INSERT INTO document_requests
            (id, candidate_id, request_type, request_message, request_status, priority, summary)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(candidate_id)
    .bind(request_type)
    .bind(message)
    .bind(status)
    .bind(priority)
    .bind(summary)
    .fetch_one(pool)
    .await
}

pub async fn list_document_requests(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Vec<DocumentRequestRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentRequestRow>(
        "SELECT * FROM document_requests WHERE candidate_id = $1 ORDER BY requested_at DESC",
    )
    .bind(candidate_id)
    .fetch_all(pool)
    .await
}

pub async fn insert_submitted_document(
    pool: &PgPool,
    candidate_id: Uuid,
    document_type: DocumentType,
    stored: &StoredFile,
) -> Result<SubmittedDocumentRow, sqlx::Error> {
    sqlx::query_as::<_, SubmittedDocumentRow>(
        r#"
        INSERT INTO submitted_documents
            (id, candidate_id, document_type, document_path, document_filename, file_size)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(candidate_id)
    .bind(document_type.as_str())
    .bind(stored.path.to_string_lossy().as_ref())
    .bind(&stored.filename)
    .bind(i64::try_from(stored.size).ok())
    .fetch_one(pool)
    .await
}

pub async fn list_submitted_documents(
    pool: &PgPool,
    candidate_id: Uuid,
) -> Result<Vec<SubmittedDocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmittedDocumentRow>(
        "SELECT * FROM submitted_documents WHERE candidate_id = $1 ORDER BY submitted_at DESC",
    )
    .bind(candidate_id)
    .fetch_all(pool)
    .await
}

pub async fn get_submitted_document(
    pool: &PgPool,
    candidate_id: Uuid,
    document_id: Uuid,
) -> Result<Option<SubmittedDocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmittedDocumentRow>(
        "SELECT * FROM submitted_documents WHERE id = $1 AND candidate_id = $2",
    )
    .bind(document_id)
    .bind(candidate_id)
    .fetch_optional(pool)
    .await
}

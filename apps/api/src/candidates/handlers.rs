use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::candidates::repository::{self, CandidateListRow};
use crate::errors::AppError;
use crate::extraction::TextExtractor;
use crate::models::candidate::{
    CandidateRow, DocumentRequestRow, DocumentType, ExtractionStatus, SubmittedDocumentRow,
};
use crate::notifications::NotificationService;
use crate::pipeline::email_writer::EmailWriter;
use crate::pipeline::models::{CandidateContact, PipelineResult};
use crate::pipeline::orchestrator::DocumentPipeline;
use crate::state::AppState;
use crate::storage::StoredFile;

const PREVIEW_CHARS: usize = 200;
const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// A file part pulled out of a multipart body.
struct UploadedFile {
    filename: String,
    bytes: Bytes,
}

#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    document_type: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                form.file = Some(UploadedFile { filename, bytes });
            }
            "document_type" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid document_type field: {e}")))?;
                form.document_type = Some(text);
            }
            _ => {}
        }
    }
    Ok(form)
}

fn require_file(file: Option<UploadedFile>) -> Result<UploadedFile, AppError> {
    let file = file.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    if file.filename.trim().is_empty() {
        return Err(AppError::Validation("No file selected".to_string()));
    }
    Ok(file)
}

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

async fn require_candidate(state: &AppState, id: Uuid) -> Result<CandidateRow, AppError> {
    repository::get_candidate(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub candidate_id: Uuid,
    pub message: String,
    pub extraction_status: ExtractionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_request_generated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_request_preview: Option<String>,
}

/// Extracts text, runs the pipeline and stores the normalized fields.
async fn process_resume(
    state: &AppState,
    candidate_id: Uuid,
    stored: &StoredFile,
) -> Result<PipelineResult, AppError> {
    let path = stored.path.clone();
    let resume_text = tokio::task::spawn_blocking(move || TextExtractor::default().extract_path(&path))
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    info!(
        "Extracted {} characters from {}",
        resume_text.len(),
        stored.filename
    );

    let result = DocumentPipeline::new(state.llm.clone())
        .run(&resume_text)
        .await?;
    repository::save_extracted_data(&state.db, candidate_id, &result.extracted_data).await?;
    Ok(result)
}

/// Stores the drafted request and notifies the candidate.
async fn send_auto_request(
    state: &AppState,
    candidate_id: Uuid,
    result: &PipelineResult,
) -> Result<(), AppError> {
    repository::insert_document_request(
        &state.db,
        candidate_id,
        &result.request_message,
        "auto-generated",
        Some(&result.request_metadata),
    )
    .await?;

    let contact = CandidateContact::from(&result.extracted_data);
    let receipts = NotificationService::send_document_request(
        contact.email.as_deref(),
        contact.phone.as_deref(),
        &result.request_message,
    );
    info!(
        "Auto document request for candidate {candidate_id}: {} notification(s)",
        receipts.len()
    );
    Ok(())
}

/// POST /api/candidates/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let file = require_file(read_form(multipart).await?.file)?;
    let stored = state.storage.save_resume(&file.filename, &file.bytes).await?;
    let candidate =
        match repository::insert_candidate(&state.db, &stored, ExtractionStatus::Processing).await {
            Ok(candidate) => candidate,
            Err(e) => {
                state.storage.delete_file(&stored.path).await;
                return Err(e.into());
            }
        };

    let result = match process_resume(&state, candidate.id, &stored).await {
        Ok(result) => result,
        Err(e) => {
            error!("Processing failed for candidate {}: {e}", candidate.id);
            repository::set_extraction_status(&state.db, candidate.id, ExtractionStatus::Failed)
                .await?;
            return Ok((
                StatusCode::CREATED,
                Json(UploadResponse {
                    candidate_id: candidate.id,
                    message: format!("Resume uploaded but extraction failed: {e}"),
                    extraction_status: ExtractionStatus::Failed,
                    auto_request_generated: None,
                    auto_request_preview: None,
                }),
            ));
        }
    };

    let auto_request_generated = match send_auto_request(&state, candidate.id, &result).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Auto document request failed for candidate {}: {e}", candidate.id);
            false
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            candidate_id: candidate.id,
            message: "Resume uploaded and processed successfully".to_string(),
            extraction_status: ExtractionStatus::Completed,
            auto_request_generated: Some(auto_request_generated),
            auto_request_preview: auto_request_generated.then(|| preview(&result.request_message)),
        }),
    ))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct CandidateListResponse {
    pub candidates: Vec<CandidateListRow>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

/// GET /api/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<CandidateListResponse>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let status = params.status.as_deref().filter(|s| !s.is_empty());

    let (candidates, total) = repository::list_candidates(&state.db, status, page, limit).await?;
    Ok(Json(CandidateListResponse {
        candidates,
        total,
        page,
        limit,
        pages: page_count(total, limit),
    }))
}

fn page_count(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

#[derive(Serialize)]
pub struct CandidateDetail {
    #[serde(flatten)]
    pub candidate: CandidateRow,
    pub extracted_data: Option<Value>,
    pub document_requests: Vec<DocumentRequestRow>,
    pub submitted_documents: Vec<SubmittedDocumentRow>,
}

/// GET /api/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateDetail>, AppError> {
    let candidate = require_candidate(&state, id).await?;
    let extracted_data = repository::get_extracted_data(&state.db, id)
        .await?
        .map(|row| row.to_view());
    let document_requests = repository::list_document_requests(&state.db, id).await?;
    let submitted_documents = repository::list_submitted_documents(&state.db, id).await?;

    Ok(Json(CandidateDetail {
        candidate,
        extracted_data,
        document_requests,
        submitted_documents,
    }))
}

#[derive(Serialize)]
pub struct RequestDocumentsResponse {
    pub request_id: Uuid,
    pub message: &'static str,
    pub request_preview: String,
    pub status: String,
}

/// POST /api/candidates/:id/request-documents
pub async fn handle_request_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<RequestDocumentsResponse>), AppError> {
    require_candidate(&state, id).await?;
    let extracted = repository::get_extracted_data(&state.db, id)
        .await?
        .ok_or_else(|| {
            AppError::Validation("No extracted data available for this candidate".to_string())
        })?;

    let contact = CandidateContact {
        full_name: extracted.full_name,
        email: extracted.email,
        phone: extracted.phone,
        current_company: extracted.current_company,
        designation: extracted.designation,
    };
    let message = EmailWriter::new(state.llm.clone())
        .generate_request_email(&contact)
        .await?;

    let request = repository::insert_document_request(&state.db, id, &message, "sent", None).await?;
    info!("Document request {} generated for candidate {id}", request.id);

    Ok((
        StatusCode::CREATED,
        Json(RequestDocumentsResponse {
            request_id: request.id,
            message: "Document request generated successfully",
            request_preview: request.request_message,
            status: request.request_status,
        }),
    ))
}

#[derive(Serialize)]
pub struct SubmitDocumentResponse {
    pub document_id: Uuid,
    pub message: &'static str,
    pub document_type: DocumentType,
    pub verification_status: String,
}

/// POST /api/candidates/:id/submit-documents
pub async fn handle_submit_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitDocumentResponse>), AppError> {
    require_candidate(&state, id).await?;
    let form = read_form(multipart).await?;

    if form.file.is_none() {
        return Err(AppError::Validation("No file provided".to_string()));
    }
    let document_type = form
        .document_type
        .as_deref()
        .and_then(DocumentType::parse)
        .ok_or_else(|| {
            AppError::Validation(
                r#"Invalid document type. Must be "pan" or "aadhaar""#.to_string(),
            )
        })?;
    let file = require_file(form.file)?;

    let stored = state.storage.save_document(&file.filename, &file.bytes).await?;
    let document =
        match repository::insert_submitted_document(&state.db, id, document_type, &stored).await {
            Ok(document) => document,
            Err(e) => {
                state.storage.delete_file(&stored.path).await;
                return Err(e.into());
            }
        };
    info!(
        "Stored {} document {} for candidate {id}",
        document_type.as_str(),
        document.id
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitDocumentResponse {
            document_id: document.id,
            message: "Document uploaded successfully",
            document_type,
            verification_status: document.verification_status,
        }),
    ))
}

/// GET /api/candidates/:id/documents/:document_id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path((id, document_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let document = repository::get_submitted_document(&state.db, id, document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {document_id} not found")))?;

    let bytes = match tokio::fs::read(&document.document_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("Document file not found".to_string()));
        }
        Err(e) => return Err(AppError::Internal(e.into())),
    };

    let content_type = mime_guess::from_path(&document.document_filename)
        .first_or_octet_stream()
        .to_string();
    let disposition = format!(
        "inline; filename=\"{}\"",
        document.document_filename.replace('"', "")
    );

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

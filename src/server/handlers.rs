//! HTTP request handlers.

use super::jobs::{JobProgress, JobSnapshot, JobState};
use super::page::INDEX_HTML;
use super::AppState;
use crate::analyze::{AnalysisRequest, DocumentInput};
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// File name offered to the browser for the downloaded report.
pub const DOWNLOAD_FILENAME: &str = "reporte_verificacion.html";

/// Errors a handler can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Formulario inválido: {0}")]
    BadMultipart(#[from] MultipartError),

    #[error("Análisis no encontrado: {0}")]
    NotFound(Uuid),

    #[error("El reporte aún no está listo")]
    NotReady,

    #[error("Error interno: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadMultipart(ref e) => e.status(),
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotReady => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub job_id: Uuid,
    pub status_url: String,
}

/// The form page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Start an analysis from the submitted form.
///
/// Answers `202` as soon as the uploads are spooled to disk; validation of
/// the credential and files happens inside the run so its outcome is
/// reported through the job status like every other phase.
pub async fn create_analysis(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let form = read_form(multipart).await?;

    state
        .jobs
        .prune(Duration::from_secs(state.config.job_retention_secs));
    let job_id = state.jobs.create();
    info!(
        "Analysis {} submitted: file1={:?} file2={:?}",
        job_id,
        form.request.file1.as_ref().map(|d| &d.filename),
        form.request.file2.as_ref().map(|d| &d.filename)
    );

    let mut run_config = state.orchestrator.config().clone();
    run_config.progress_callback = Some(Arc::new(JobProgress::new(state.jobs.clone(), job_id)));
    let orchestrator = state.orchestrator.with_config(run_config);
    let jobs = state.jobs.clone();

    tokio::spawn(async move {
        // Uploaded files stay on disk until the run is over.
        let _uploads = form.uploads;
        match orchestrator.run(&form.request).await {
            Ok(output) => {
                let report_file = match output.materialize() {
                    Ok(file) => Some(file),
                    Err(e) => {
                        error!("Analysis {}: {}", job_id, e);
                        None
                    }
                };
                jobs.complete(job_id, output, report_file);
                info!("Analysis {} completed in {:?}", job_id, jobs.age(job_id));
            }
            Err(e) => {
                // The progress callback already recorded the failure.
                info!("Analysis {} failed: {}", job_id, e.title());
            }
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(CreatedResponse {
            job_id,
            status_url: format!("/api/analyses/{job_id}"),
        }),
    ))
}

/// Current state of an analysis.
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobSnapshot>, ApiError> {
    state
        .jobs
        .snapshot(job_id)
        .map(Json)
        .ok_or(ApiError::NotFound(job_id))
}

/// The rendered report, for inline display.
pub async fn get_report(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    ensure_completed(&state, job_id)?;
    state
        .jobs
        .report_html(job_id)
        .map(Html)
        .ok_or(ApiError::NotReady)
}

/// The materialised report file, as an attachment.
pub async fn download_report(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    ensure_completed(&state, job_id)?;
    let path = state.jobs.report_path(job_id).ok_or(ApiError::NotReady)?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::Internal(format!("{}: {e}", path.display())))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn ensure_completed(state: &AppState, job_id: Uuid) -> Result<(), ApiError> {
    match state.jobs.state(job_id) {
        None => Err(ApiError::NotFound(job_id)),
        Some(JobState::Completed) => Ok(()),
        Some(_) => Err(ApiError::NotReady),
    }
}

/// Parsed form plus the temp files backing its documents.
struct SubmittedForm {
    request: AnalysisRequest,
    uploads: Vec<NamedTempFile>,
}

/// Read `api_key`, `file1` and `file2`. A file part with no name and no
/// bytes (what browsers send for an empty file input) counts as absent.
async fn read_form(mut multipart: Multipart) -> Result<SubmittedForm, ApiError> {
    let mut request = AnalysisRequest::default();
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "api_key" => {
                request.api_key = field.text().await?.trim().to_string();
            }
            "file1" | "file2" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if bytes.is_empty() && filename.is_empty() {
                    continue;
                }
                let upload = spool(&bytes).await?;
                let doc = DocumentInput::new(&filename, upload.path());
                uploads.push(upload);
                if name == "file1" {
                    request.file1 = Some(doc);
                } else {
                    request.file2 = Some(doc);
                }
            }
            _ => continue,
        }
    }

    Ok(SubmittedForm { request, uploads })
}

async fn spool(bytes: &[u8]) -> Result<NamedTempFile, ApiError> {
    let file = tempfile::Builder::new()
        .prefix("upload_")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    tokio::fs::write(file.path(), bytes)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(file)
}

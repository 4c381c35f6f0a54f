//! Route handlers: upload form, CSV scoring, health.

use super::error::{ApiError, Result};
use super::state::AppState;
use crate::config::ReportConfig;
use crate::features::parse_csv;
use crate::model::RiskScorer;
use crate::report::{build_report, render_upload_form};
use crate::risk::{attach_predictions, LabelCounts};
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Multipart field carrying the CSV
pub const FILE_FIELD: &str = "file";

struct Upload {
    file_name: String,
    data: Bytes,
}

/// Filename checks, in order: present, non-empty, then `.csv` suffix.
/// A part without a filename is a plain form field, not a file.
pub fn validate_file_name(name: Option<&str>) -> Result<&str> {
    match name {
        None => Err(ApiError::NoFilePart),
        Some("") => Err(ApiError::NoSelectedFile),
        Some(n) if !n.ends_with(".csv") => Err(ApiError::InvalidFormat),
        Some(n) => Ok(n),
    }
}

fn upload_error(e: MultipartError) -> ApiError {
    let status = e.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::TooLarge;
    }
    ApiError::Upload {
        status,
        message: e.body_text(),
    }
}

async fn read_upload(multipart: std::result::Result<Multipart, MultipartRejection>) -> Result<Upload> {
    let mut multipart = multipart.map_err(|_| ApiError::NoFilePart)?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = validate_file_name(field.file_name())?.to_string();
        let data = field
            .bytes()
            .await
            .map_err(upload_error)?;
        return Ok(Upload { file_name, data });
    }
    Err(ApiError::NoFilePart)
}

/// Parse, score, join and render. CPU-bound; runs on the blocking pool.
pub fn score_csv(
    scorer: &dyn RiskScorer,
    data: &[u8],
    report: &ReportConfig,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let table = parse_csv(data)?;
    debug!(rows = table.len(), "parsed upload");
    let classes = scorer.predict(table.features())?;
    let results = attach_predictions(table.ids(), &classes)?;

    let counts = LabelCounts::from_results(&results);
    info!(
        rows = results.len(),
        low = counts.low,
        high = counts.high,
        model = scorer.name(),
        "upload scored"
    );

    Ok(build_report(&results, report, generated_at)?)
}

pub async fn upload_form() -> Html<String> {
    Html(render_upload_form())
}

pub async fn predict_upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Html<String>> {
    let request_id = Uuid::new_v4();
    let span = info_span!("upload", %request_id);

    let outcome = async move {
        let upload = read_upload(multipart).await?;
        info!(file = %upload.file_name, bytes = upload.data.len(), "received upload");

        let scorer = Arc::clone(&state.scorer);
        let report = state.report.clone();
        tokio::task::spawn_blocking(move || {
            score_csv(scorer.as_ref(), &upload.data, &report, Utc::now())
        })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
    }
    .instrument(span.clone())
    .await;

    if let Err(e) = &outcome {
        if e.status().is_client_error() {
            span.in_scope(|| warn!(status = e.status().as_u16(), error = %e, "upload rejected"));
        }
    }
    outcome.map(Html)
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "model": state.scorer.name(),
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

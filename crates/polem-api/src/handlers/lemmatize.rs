//! Label batch lemmatization handler

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{self, HeaderMap, HeaderName, HeaderValue},
        Method, StatusCode,
    },
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of documents that could not be enriched
pub const FAILED_DOCUMENTS_HEADER: &str = "x-polem-failed-documents";

/// Indentation of the returned JSON
const RESPONSE_INDENT: usize = 2;

/// Enrich a label batch with Polem labels
#[utoipa::path(
    post,
    path = "/api/v1/lemmatize",
    tag = "lemmatize",
    request_body(
        content = String,
        description = "Label batch: {\"docs\": [{\"labels\": [...]}]}",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Batch with derived labels appended"),
        (status = 400, description = "Body is not valid JSON", body = crate::error::ApiError),
        (status = 405, description = "Method other than POST", body = crate::error::ApiError),
        (status = 415, description = "Content type is not application/json", body = crate::error::ApiError),
        (status = 422, description = "Batch is structurally invalid", body = crate::error::ApiError)
    )
)]
pub async fn lemmatize_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    state.increment_requests();
    debug!(%method, body_length = body.len(), "received lemmatize request");

    if method != Method::POST {
        warn!(%method, "request rejected");
        return Err(AppError::MethodNotAllowed(
            "Invalid request method; only POST is accepted.".to_string(),
        ));
    }

    if !is_json_content_type(&headers) {
        warn!("request rejected: content type");
        return Err(AppError::UnsupportedMediaType(
            "Invalid request content type; \"application/json\" expected.".to_string(),
        ));
    }

    let batch: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;

    let (batch, report) = state.process_batch(batch).await?;
    info!(
        processed = report.documents_processed,
        failed = report.failures.len(),
        labels_added = report.labels_added,
        "input JSON processed"
    );

    let mut output = polem_parser::to_pretty_string(&batch, RESPONSE_INDENT)?;
    output.push('\n');

    let mut response = (StatusCode::OK, output).into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response_headers.insert(
        HeaderName::from_static(FAILED_DOCUMENTS_HEADER),
        HeaderValue::from(report.failures.len()),
    );

    Ok(response)
}

/// Whether the request declares a JSON body, ignoring parameters like charset
fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

//! Book file delivery.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use tracing::info;

use folio_core::CoreError;

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next().map(str::to_lowercase).as_deref() {
        Some("epub") => "application/epub+zip",
        Some("pdf") => "application/pdf",
        Some("mobi") | Some("azw3") => "application/x-mobipocket-ebook",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

pub async fn file_handler(
    State(state): State<AppState>,
    Path((id, format)): Path<(i64, String)>,
) -> AppResult<Response> {
    let file = state.store.file_data(id, &format).await?;
    let bytes = tokio::fs::read(&file.path).await.map_err(CoreError::Io)?;

    info!(book_id = id, format, filename = %file.filename, "serving book file");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(content_type_for(&file.filename)),
    );
    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    headers.insert(
        header::CONTENT_DISPOSITION,
        header::HeaderValue::from_str(&disposition)
            .map_err(|e| AppError::internal("internal server error").with_detail(e.to_string()))?,
    );

    Ok((headers, bytes).into_response())
}

//! Cover delivery through the thumbnail cache.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use tracing::debug;

use folio_core::CoreError;
use folio_core::thumbs::CoverProfile;

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

/// Path format: `/covers/{profile}/{id}` where profile is `list` or
/// `detail`.
pub async fn cover_handler(
    State(state): State<AppState>,
    Path((profile, id)): Path<(String, i64)>,
) -> AppResult<Response> {
    let profile = CoverProfile::from_name(&profile)
        .ok_or_else(|| AppError::bad_request("unknown cover profile"))?;

    let cover = state.store.cover_data(id).await?;
    let path = state
        .thumbs
        .resolve(&cover.path, cover.book_id, profile)
        .await?;

    debug!(book_id = id, ?path, "serving cover thumbnail");
    let bytes = tokio::fs::read(&path).await.map_err(CoreError::Io)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("image/jpeg"),
    );
    // Thumbnails are write-once; cache them hard.
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=31536000"),
    );

    Ok((headers, bytes).into_response())
}

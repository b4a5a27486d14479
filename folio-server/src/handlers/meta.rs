//! Catalog metadata listings: tags, custom columns, statistics.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{Value, json};

use crate::errors::AppResult;
use crate::infra::app_state::AppState;

pub async fn tags_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let tags = state.store.tags().await?;
    Ok(Json(json!({ "tags": tags })))
}

pub async fn custom_columns_handler(
    State(state): State<AppState>,
    Path(num): Path<i64>,
) -> AppResult<Json<Value>> {
    let values = state.store.custom_columns(num).await?;
    Ok(Json(json!({ "values": values })))
}

pub async fn stats_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let stats = state.store.statistics().await?;
    Ok(Json(json!({ "stats": stats })))
}

//! Listing and detail endpoints: the request-time decision logic that
//! turns a partially-specified filter into one page of enriched books.

use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use folio_core::catalog::{count_for, find_for};
use folio_core::enrich::{enrich_books, enrich_detail};
use folio_core::navigate;
use folio_core::query::{Dimension, Filter, RawListOptions, coerce_id, paginate};

use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

pub async fn list_books_handler(
    State(state): State<AppState>,
    Json(raw): Json<RawListOptions>,
) -> AppResult<Json<Value>> {
    let filter = Filter::resolve(&raw);
    let store = state.store.as_ref();

    let total = count_for(store, &filter).await?;
    if total == 0 {
        return Ok(Json(json!({
            "books": [],
            "pageNav": { "size": 0 },
            "message": "no books matched your request",
        })));
    }

    let page_size = state.config.page_size;
    let nav = paginate(raw.page(), total, page_size);
    let mut books = find_for(store, &filter, page_size, nav.page * page_size).await?;
    enrich_books(store, &mut books).await?;

    info!(total, page = nav.page, count = books.len(), "listing books");
    Ok(Json(json!({ "books": books, "pageNav": nav })))
}

/// Detail request: the filter fields mirror the listing request so the
/// prev/next neighbors resolve under the exact ordering the book was
/// listed in. `num` is the book's 1-based row number on that listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookDetailRequest {
    pub book_id: Option<Value>,
    pub num: Option<Value>,
    #[serde(flatten)]
    pub filter: RawListOptions,
}

pub async fn book_detail_handler(
    State(state): State<AppState>,
    Json(req): Json<BookDetailRequest>,
) -> AppResult<Json<Value>> {
    let filter = Filter::resolve(&req.filter);
    let num = coerce_id(&req.num).max(1) as u64;
    let store = state.store.as_ref();

    // The facade has no get-by-id; the row number locates the book inside
    // its listing's ordering, like the navigator does for its neighbors.
    let current = find_for(store, &filter, 1, num - 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("book not found"))?;

    // The ordinal is authoritative; a stale client can send a bookId that
    // no longer sits at that row.
    let requested_id = coerce_id(&req.book_id);
    if requested_id > 0 && requested_id != current.id {
        warn!(
            requested_id,
            found = current.id,
            num,
            "book id does not match the row at this position"
        );
    }

    let adjacent = navigate::locate(store, &filter, num).await?;

    let mut page = vec![current];
    let has_prev = adjacent.previous.is_some();
    if let Some(prev) = adjacent.previous {
        page.push(prev);
    }
    let has_next = adjacent.next.is_some();
    if let Some(next) = adjacent.next {
        page.push(next);
    }
    enrich_books(store, &mut page).await?;

    let next_book = if has_next { page.pop() } else { None };
    let prev_book = if has_prev { page.pop() } else { None };
    let mut book = page
        .pop()
        .ok_or_else(|| AppError::internal("internal server error"))?;
    enrich_detail(store, &mut book).await?;

    // Browsing by custom column also shows that column's values for the
    // book itself.
    let cc_values = match filter.dimension {
        Dimension::CustomColumn { num, .. } => {
            Some(store.custom_column_of_book(num, book.id).await?)
        }
        _ => None,
    };

    info!(book_id = book.id, num, "book detail");
    Ok(Json(json!({
        "book": book,
        "prevBook": prev_book,
        "nextBook": next_book,
        "ccValues": cc_values,
    })))
}

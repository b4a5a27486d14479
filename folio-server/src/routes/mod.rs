use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::{books, covers, files, meta};
use crate::infra::app_state::AppState;

/// Builds the full application router. Layers (trace, CORS) are applied by
/// the caller.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .route("/covers/{profile}/{id}", get(covers::cover_handler))
        .route("/files/{id}/{format}", get(files::file_handler))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/books", post(books::list_books_handler))
        .route("/book", post(books::book_detail_handler))
        .route("/tags", get(meta::tags_handler))
        .route("/custom-columns/{num}", get(meta::custom_columns_handler))
        .route("/stats", get(meta::stats_handler))
}

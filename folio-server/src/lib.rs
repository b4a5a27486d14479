//! # Folio Server
//!
//! Read-only HTTP server for browsing a Calibre book catalog: filtered
//! listings with stable pagination, book detail with prev/next navigation
//! under the listing's ordering, cached cover thumbnails, and file
//! delivery.
//!
//! Built on Axum; the catalog sits behind the `folio-core` store trait and
//! is served from a Calibre `metadata.db` by `folio-store`.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::config::Config;

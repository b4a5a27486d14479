//! # Folio Core
//!
//! Request-time catalog logic for the Folio book server:
//!
//! - **Filter resolution**: raw request fields into a normalized
//!   single-dimension [`query::Filter`]
//! - **Pagination**: page bounds and navigation-link states
//! - **Field enrichment**: batch-attaching authors/formats/series/tags
//! - **Adjacent navigation**: prev/next under the originating ordering
//! - **Thumbnail cache**: on-demand, sharded, generate-once cover resizes
//!
//! The persisted catalog itself sits behind the [`catalog::CatalogStore`]
//! trait; `folio-store` provides the Calibre-backed implementation.

pub mod catalog;
pub mod enrich;
pub mod error;
pub mod navigate;
pub mod query;
pub mod thumbs;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::{CoreError, Result};

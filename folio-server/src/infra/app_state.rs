use std::sync::Arc;

use folio_core::catalog::CatalogStore;
use folio_core::thumbs::ThumbnailCache;

use crate::infra::config::Config;

/// Shared per-process state handed to every handler. Cheap to clone; the
/// store and config are behind `Arc`s, the thumbnail cache is just a root
/// path.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub thumbs: ThumbnailCache,
    pub config: Arc<Config>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("thumbs", &self.thumbs)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

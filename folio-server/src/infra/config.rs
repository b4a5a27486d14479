use anyhow::Context;
use serde::Deserialize;
use std::{env, path::PathBuf};

/// Server configuration loaded once at startup from environment variables
/// (with `.env` support). There is no hot-reload; the log filter below is
/// the process-wide log-level setting, applied exactly once in `main`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Catalog settings
    pub library_root: PathBuf,
    pub thumbnail_cache_dir: PathBuf,
    pub page_size: u64,

    // CORS settings
    pub cors_allowed_origins: Vec<String>,

    // Logging
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),

            library_root: env::var("LIBRARY_ROOT").map(PathBuf::from).unwrap_or_default(),
            thumbnail_cache_dir: env::var("THUMBNAIL_CACHE_DIR")
                .unwrap_or_else(|_| "./cache/thumbnails".to_string())
                .into(),
            page_size: env::var("PAGE_SIZE")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),

            log_filter: env::var("LOG_FILTER").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// The library root comes from `LIBRARY_ROOT` or a CLI override, so it
    /// is checked after both are applied.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.library_root.as_os_str().is_empty(),
            "no Calibre library configured: set LIBRARY_ROOT or pass --library"
        );
        anyhow::ensure!(
            self.library_root.join("metadata.db").is_file(),
            "{} does not contain a metadata.db",
            self.library_root.display()
        );
        Ok(())
    }

    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.thumbnail_cache_dir)
            .context("creating thumbnail cache directory")?;
        Ok(())
    }

    /// Canonicalize directories so downstream services work with absolute
    /// paths. Called once during startup immediately after
    /// `ensure_directories`.
    pub fn normalize_paths(&mut self) -> anyhow::Result<()> {
        self.library_root = std::fs::canonicalize(&self.library_root)
            .context("LIBRARY_ROOT does not exist")?;
        self.thumbnail_cache_dir = std::fs::canonicalize(&self.thumbnail_cache_dir)?;
        Ok(())
    }
}

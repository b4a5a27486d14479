//! On-demand cover thumbnail cache.
//!
//! Cache files are write-once/read-many and never expired: a cached file is
//! served as-is with no freshness check against the source image. Two
//! concurrent first accesses for the same key may both resize; the writes
//! are idempotent and land via temp-file + rename, so a reader never sees a
//! partial JPEG.

use std::path::{Path, PathBuf};

use image::GenericImageView;
use image::imageops::FilterType;
use tracing::debug;

use crate::error::{CoreError, Result};

/// Fixed resize geometries for the two cover renditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverProfile {
    /// Listing grid: fixed height 250, width follows the aspect ratio.
    List,
    /// Detail view: fixed width 320, height follows the aspect ratio.
    Detail,
}

impl CoverProfile {
    /// Leading digit of the shard directory, keeping the two profiles'
    /// caches from ever colliding in storage.
    pub fn prefix(self) -> char {
        match self {
            CoverProfile::List => '1',
            CoverProfile::Detail => '0',
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "list" => Some(CoverProfile::List),
            "detail" => Some(CoverProfile::Detail),
            _ => None,
        }
    }

    /// Target dimensions for a source of `width` x `height`.
    fn geometry(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            CoverProfile::List => {
                let w = (u64::from(width) * 250 / u64::from(height.max(1))) as u32;
                (w.max(1), 250)
            }
            CoverProfile::Detail => {
                let h = (u64::from(height) * 320 / u64::from(width.max(1))) as u32;
                (320, h.max(1))
            }
        }
    }
}

/// Resolves cover images to cached, size-specific files, generating each
/// one once from the source image.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    root: PathBuf,
}

impl ThumbnailCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Deterministic cache location: `{root}/{leading}{shard}/{id}.jpg`,
    /// where `shard` is the two most-significant digits of the zero-padded
    /// 5-digit id. Bounds every profile to at most 100 subdirectories.
    pub fn cache_path(&self, id: i64, profile: CoverProfile) -> PathBuf {
        let padded = format!("{:05}", id.max(0));
        let shard = &padded[..2];
        self.root
            .join(format!("{}{}", profile.prefix(), shard))
            .join(format!("{id}.jpg"))
    }

    /// Returns the cache file for `(id, profile)`, resizing `source` into
    /// it first if this is the first access.
    pub async fn resolve(&self, source: &Path, id: i64, profile: CoverProfile) -> Result<PathBuf> {
        let target = self.cache_path(id, profile);

        match tokio::fs::metadata(&target).await {
            Ok(_) => return Ok(target),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        // A catalog row can claim a cover the library directory lacks.
        // Surface that as the io error it is before any resize work.
        tokio::fs::metadata(source).await?;

        let shard_dir = target
            .parent()
            .ok_or_else(|| CoreError::Internal("cache path has no parent".into()))?
            .to_path_buf();
        tokio::fs::create_dir_all(&shard_dir).await?;

        debug!(book_id = id, ?target, "generating cover thumbnail");

        let source = source.to_path_buf();
        let dest = target.clone();
        tokio::task::spawn_blocking(move || render_thumbnail(&source, &dest, &shard_dir, profile))
            .await
            .map_err(|e| CoreError::Internal(format!("thumbnail task join: {e}")))??;

        Ok(target)
    }
}

/// Decode, resize, and encode to a temp file in the shard directory, then
/// rename into place.
fn render_thumbnail(
    source: &Path,
    target: &Path,
    shard_dir: &Path,
    profile: CoverProfile,
) -> Result<()> {
    let img = image::open(source)?;
    let (width, height) = img.dimensions();
    let (tw, th) = profile.geometry(width, height);
    let resized = img.resize_exact(tw, th, FilterType::Lanczos3);

    let mut tmp = tempfile::Builder::new()
        .prefix(".thumb-")
        .suffix(".tmp")
        .tempfile_in(shard_dir)?;
    // JPEG has no alpha channel.
    image::DynamicImage::ImageRgb8(resized.to_rgb8())
        .write_to(tmp.as_file_mut(), image::ImageFormat::Jpeg)?;
    tmp.persist(target).map_err(|e| CoreError::Io(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CoverProfile, ThumbnailCache};
    use image::GenericImageView;
    use std::path::Path;

    fn write_source_png(dir: &Path, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join("cover.png");
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 40, 40]));
        img.save(&path).expect("write source image");
        path
    }

    #[test]
    fn shard_path_is_deterministic() {
        let cache = ThumbnailCache::new("/cache");
        assert_eq!(
            cache.cache_path(42, CoverProfile::List),
            Path::new("/cache/100/42.jpg")
        );
        assert_eq!(
            cache.cache_path(42, CoverProfile::Detail),
            Path::new("/cache/000/42.jpg")
        );
        assert_eq!(
            cache.cache_path(31415, CoverProfile::List),
            Path::new("/cache/131/31415.jpg")
        );
    }

    #[test]
    fn profiles_never_collide() {
        let cache = ThumbnailCache::new("/cache");
        assert_ne!(
            cache.cache_path(7, CoverProfile::List),
            cache.cache_path(7, CoverProfile::Detail)
        );
    }

    #[test]
    fn list_geometry_fixes_height() {
        assert_eq!(CoverProfile::List.geometry(600, 900), (166, 250));
        assert_eq!(CoverProfile::Detail.geometry(600, 900), (320, 480));
    }

    #[tokio::test]
    async fn first_access_generates_resized_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source_png(dir.path(), 600, 900);
        let cache = ThumbnailCache::new(dir.path().join("thumbs"));

        let path = cache
            .resolve(&source, 42, CoverProfile::List)
            .await
            .unwrap();
        assert!(path.ends_with("100/42.jpg"));

        let thumb = image::open(&path).unwrap();
        assert_eq!(thumb.dimensions().1, 250);
    }

    #[tokio::test]
    async fn second_access_serves_cached_file_without_regenerating() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source_png(dir.path(), 400, 400);
        let cache = ThumbnailCache::new(dir.path().join("thumbs"));

        let path = cache
            .resolve(&source, 7, CoverProfile::Detail)
            .await
            .unwrap();

        // Replace the cache file with sentinel bytes; if resolve resized
        // again the sentinel would be overwritten.
        std::fs::write(&path, b"sentinel").unwrap();
        let again = cache
            .resolve(&source, 7, CoverProfile::Detail)
            .await
            .unwrap();

        assert_eq!(again, path);
        assert_eq!(std::fs::read(&path).unwrap(), b"sentinel");
    }

    #[tokio::test]
    async fn missing_source_surfaces_a_not_found_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ThumbnailCache::new(dir.path().join("thumbs"));

        let result = cache
            .resolve(Path::new("/nonexistent/cover.jpg"), 1, CoverProfile::List)
            .await;
        match result {
            Err(crate::error::CoreError::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io not-found, got {other:?}"),
        }
    }
}

//! Lazily generated, cached JPEG previews for approved videos.
//!
//! A thumbnail is `<stem>.jpg` in the cache directory and its existence is the
//! only state kept. Once written it is never regenerated, even if the video
//! changes afterwards.

mod disabled;
#[cfg(feature = "ffmpeg")]
mod library;
mod transcoder;

pub use disabled::DisabledExtractor;
#[cfg(feature = "ffmpeg")]
pub use library::LibraryExtractor;
pub use transcoder::TranscoderExtractor;

use crate::config::{ThumbnailBackendKind, ThumbnailConfig};
use crate::services::store::{self, MediaLayout, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("no video-capable thumbnail backend is available")]
    Unavailable,
    #[error(transparent)]
    Path(#[from] StoreError),
    #[error("cannot open video: {0}")]
    Open(String),
    #[error("video has no video stream")]
    NoVideoStream,
    #[error("no frame decoded at the seek point: {0}")]
    Decode(String),
    #[error("thumbnail encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("transcoder timed out after {0:?}")]
    Timeout(Duration),
    #[error("transcoder failed: {0}")]
    Process(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub video: PathBuf,
    pub dest: PathBuf,
    pub seek: Duration,
    pub width: u32,
}

/// A way of turning one video frame into a JPEG file.
///
/// Implementations write a `request.width` wide JPEG of the frame at
/// `request.seek` to `request.dest` and must release every decoder or child
/// process they acquire before returning, on success and on failure.
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract(&self, request: &ExtractRequest) -> Result<(), ThumbnailError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailOutcome {
    Cached,
    Generated,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WarmupReport {
    pub generated: usize,
    pub cached: usize,
    pub failed: usize,
}

/// `seek` expressed in ticks of a stream time base of `numerator / denominator` seconds.
pub fn seek_in_ticks(seek: Duration, numerator: i32, denominator: i32) -> i64 {
    if numerator <= 0 || denominator <= 0 {
        return 0;
    }
    let ticks = i128::try_from(seek.as_micros()).unwrap_or(i128::MAX) * i128::from(denominator)
        / (i128::from(numerator) * 1_000_000);
    i64::try_from(ticks).unwrap_or(i64::MAX)
}

/// Decoders land on the keyframe before the seek point; frames before `target` are skipped.
/// A frame without a timestamp is taken as is.
pub fn frame_reaches(timestamp: Option<i64>, target: i64) -> bool {
    timestamp.map_or(true, |ts| ts >= target)
}

pub fn select_extractor(config: &ThumbnailConfig) -> Arc<dyn FrameExtractor> {
    let transcoder =
        || -> Arc<dyn FrameExtractor> { Arc::new(TranscoderExtractor::new(&config.ffmpeg_path, config.timeout())) };

    match config.backend {
        ThumbnailBackendKind::Disabled => Arc::new(DisabledExtractor),
        ThumbnailBackendKind::Transcoder => transcoder(),
        ThumbnailBackendKind::Library => library_extractor().unwrap_or_else(|| {
            tracing::warn!("Built without the `ffmpeg` feature; thumbnails are disabled");
            Arc::new(DisabledExtractor)
        }),
        ThumbnailBackendKind::Auto => library_extractor().unwrap_or_else(transcoder),
    }
}

#[cfg(feature = "ffmpeg")]
fn library_extractor() -> Option<Arc<dyn FrameExtractor>> {
    Some(Arc::new(LibraryExtractor))
}

#[cfg(not(feature = "ffmpeg"))]
fn library_extractor() -> Option<Arc<dyn FrameExtractor>> {
    None
}

type LockTable = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// One caller's claim on a stem's lock. The table entry goes away with the last claim.
struct InFlightSlot<'a> {
    table: &'a LockTable,
    key: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl<'a> InFlightSlot<'a> {
    fn reserve(table: &'a LockTable, key: String) -> Self {
        let lock = table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .clone();
        Self { table, key, lock }
    }

    fn lock(&self) -> &tokio::sync::Mutex<()> {
        &self.lock
    }
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // our reference goes first, under the table lock
        drop(std::mem::take(&mut self.lock));
        if table.get(&self.key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            table.remove(&self.key);
        }
    }
}

pub struct ThumbnailGenerator {
    videos: PathBuf,
    cache: PathBuf,
    seek: Duration,
    width: u32,
    extractor: Arc<dyn FrameExtractor>,
    in_flight: LockTable,
}

impl ThumbnailGenerator {
    pub fn new(layout: &MediaLayout, config: &ThumbnailConfig, extractor: Arc<dyn FrameExtractor>) -> Self {
        Self {
            videos: layout.videos.clone(),
            cache: layout.thumbnails.clone(),
            seek: config.seek(),
            width: config.width,
            extractor,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(layout: &MediaLayout, config: &ThumbnailConfig) -> Self {
        Self::new(layout, config, select_extractor(config))
    }

    pub fn backend_name(&self) -> &'static str {
        self.extractor.name()
    }

    pub fn cache_path(&self, video_name: &str) -> PathBuf {
        self.cache.join(store::thumbnail_name(video_name))
    }

    /// Best effort: `true` when a thumbnail exists afterwards. Never fails the caller.
    pub async fn ensure_thumbnail(&self, video_name: &str) -> bool {
        match self.generate(video_name).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    video = %video_name,
                    backend = self.extractor.name(),
                    reason = %e,
                    "Thumbnail generation failed"
                );
                false
            }
        }
    }

    /// Like [`ensure_thumbnail`](Self::ensure_thumbnail) but reports why it failed.
    pub async fn generate(&self, video_name: &str) -> Result<ThumbnailOutcome, ThumbnailError> {
        let video = store::resolve_safe_path(&self.videos, video_name)?;
        let thumb_path = self.cache_path(video_name);
        if thumb_path.is_file() {
            return Ok(ThumbnailOutcome::Cached);
        }

        // released on every exit, including a caller dropping this future mid-render
        let slot = InFlightSlot::reserve(&self.in_flight, store::thumbnail_name(video_name));
        let _guard = slot.lock().lock().await;
        if thumb_path.is_file() {
            return Ok(ThumbnailOutcome::Cached);
        }
        self.render(&video, &thumb_path).await
    }

    /// Stems with a generation running or queued.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    async fn render(&self, video: &Path, thumb_path: &Path) -> Result<ThumbnailOutcome, ThumbnailError> {
        if !video.is_file() {
            return Err(ThumbnailError::Open(format!("{} does not exist", video.display())));
        }
        tokio::fs::create_dir_all(&self.cache).await?;

        let stem = thumb_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("thumb");
        let temp = self
            .cache
            .join(format!(".{}.{}.tmp.jpg", stem, Uuid::new_v4().simple()));

        let request = ExtractRequest {
            video: video.to_path_buf(),
            dest: temp.clone(),
            seek: self.seek,
            width: self.width,
        };

        let written = match self.extractor.extract(&request).await {
            Ok(()) => match tokio::fs::metadata(&temp).await {
                Ok(meta) if meta.len() > 0 => tokio::fs::rename(&temp, thumb_path)
                    .await
                    .map_err(ThumbnailError::from),
                _ => Err(ThumbnailError::Decode("backend produced no image".into())),
            },
            Err(e) => Err(e),
        };

        if written.is_err() {
            let _ = tokio::fs::remove_file(&temp).await;
        } else {
            tracing::debug!(thumbnail = %thumb_path.display(), backend = self.extractor.name(), "Thumbnail generated");
        }
        written.map(|()| ThumbnailOutcome::Generated)
    }

    /// Generates every missing thumbnail for the approved videos.
    pub async fn warm(&self, videos: &[String]) -> WarmupReport {
        let mut report = WarmupReport::default();
        for name in videos {
            match self.generate(name).await {
                Ok(ThumbnailOutcome::Generated) => report.generated += 1,
                Ok(ThumbnailOutcome::Cached) => report.cached += 1,
                Err(e) => {
                    tracing::warn!(video = %name, reason = %e, "Thumbnail generation failed");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

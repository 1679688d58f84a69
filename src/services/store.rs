use crate::models::{Location, MediaFile, MediaKind};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

pub const VIDEO_DIR: &str = "assets/vedios";
pub const IMAGE_DIR: &str = "assets/image";
pub const THUMB_DIR: &str = "assets/thubnail";
pub const LEGACY_THUMB_DIR: &str = "assets/thumbnail";
pub const PENDING_DIR: &str = "assets/not-approve-vedio";

/// Served in place of a missing thumbnail when present in the image directory.
pub const DEFAULT_THUMBNAIL: &str = "default.jpg";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("file already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid file name: {0}")]
    InvalidName(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The fixed directory tree under a library root.
#[derive(Debug, Clone)]
pub struct MediaLayout {
    pub root: PathBuf,
    pub videos: PathBuf,
    pub images: PathBuf,
    pub thumbnails: PathBuf,
    pub legacy_thumbnails: PathBuf,
    pub pending: PathBuf,
}

impl MediaLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            videos: root.join(VIDEO_DIR),
            images: root.join(IMAGE_DIR),
            thumbnails: root.join(THUMB_DIR),
            legacy_thumbnails: root.join(LEGACY_THUMB_DIR),
            pending: root.join(PENDING_DIR),
        }
    }

    pub fn approved_dir(&self, kind: MediaKind) -> &Path {
        match kind {
            MediaKind::Video => &self.videos,
            MediaKind::Image => &self.images,
        }
    }

    pub fn ensure(&self) -> io::Result<()> {
        for dir in [
            &self.videos,
            &self.images,
            &self.thumbnails,
            &self.legacy_thumbnails,
            &self.pending,
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Reduces an arbitrary client-supplied name to a bare, ASCII-only filename.
///
/// Separators become spaces, whitespace runs become `_`, anything outside
/// `[A-Za-z0-9_.-]` is dropped and leading/trailing dots and underscores are
/// stripped, so `"My Clip.mp4"` becomes `"My_Clip.mp4"`.
pub fn sanitize_filename(raw: &str) -> String {
    let ascii: String = raw
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

fn extension_of(name: &str) -> Option<&str> {
    Path::new(name).extension().and_then(|e| e.to_str())
}

pub fn is_allowed(name: &str) -> bool {
    classify_kind(name).is_some()
}

/// Extension based classification. `None` means the name is outside the allow-list.
pub fn classify_kind(name: &str) -> Option<MediaKind> {
    extension_of(name).and_then(MediaKind::from_extension)
}

pub fn thumbnail_name(video_name: &str) -> String {
    let stem = Path::new(video_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(video_name);
    format!("{}.jpg", stem)
}

/// Display title: stem with underscores as spaces, each word capitalized.
pub fn title_for(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    let mut title = String::with_capacity(stem.len());
    let mut prev_cased = false;
    for c in stem.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if prev_cased {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            title.push(c);
            prev_cased = false;
        }
    }
    title
}

/// Rejects anything that is not a bare filename. Never touches the filesystem.
fn check_bare_name(raw_name: &str) -> StoreResult<()> {
    let trimmed = raw_name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || raw_name.contains(['/', '\\', '\0'])
        || Path::new(raw_name).is_absolute()
    {
        return Err(StoreError::InvalidPath(raw_name.to_string()));
    }
    Ok(())
}

/// Joins a sanitized `raw_name` onto `base` and proves the result stays inside it.
///
/// Traversal and separator content is rejected before any filesystem access.
/// Existing targets are canonicalized so a symlink pointing out of `base` is
/// refused as well.
pub fn resolve_safe_path(base: &Path, raw_name: &str) -> StoreResult<PathBuf> {
    check_bare_name(raw_name)?;

    let clean = sanitize_filename(raw_name);
    if clean.is_empty() {
        return Err(StoreError::InvalidPath(raw_name.to_string()));
    }

    let base_resolved = base.canonicalize().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound(base.display().to_string()),
        _ => StoreError::Io(e),
    })?;

    let candidate = base_resolved.join(&clean);
    let resolved = match candidate.canonicalize() {
        Ok(path) => path,
        Err(e) if e.kind() == io::ErrorKind::NotFound => candidate,
        Err(e) => return Err(e.into()),
    };

    if resolved == base_resolved || !resolved.starts_with(&base_resolved) {
        return Err(StoreError::InvalidPath(raw_name.to_string()));
    }

    Ok(resolved)
}

/// Immediate files of `dir` whose extension belongs to one of `kinds`, in
/// enumeration order. A missing directory lists as empty.
pub fn list_media(dir: &Path, kinds: &[MediaKind], location: Location) -> StoreResult<Vec<MediaFile>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if let Some(kind) = classify_kind(&name).filter(|k| kinds.contains(k)) {
            files.push(MediaFile {
                name,
                kind,
                location,
            });
        }
    }
    Ok(files)
}

fn list_file_names(dir: &Path) -> StoreResult<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            // in-flight uploads and moves
            if !name.starts_with('.') {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

fn file_name_string(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

fn io_not_found(e: io::Error, name: &str) -> StoreError {
    if e.kind() == io::ErrorKind::NotFound {
        StoreError::NotFound(name.to_string())
    } else {
        StoreError::Io(e)
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = file_name_string(path);
    path.with_file_name(format!(".{}.{}.part", name, Uuid::new_v4().simple()))
}

#[cfg(unix)]
fn is_cross_device(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(not(unix))]
fn is_cross_device(e: &io::Error) -> bool {
    // ERROR_NOT_SAME_DEVICE
    e.raw_os_error() == Some(17)
}

/// Rename, or copy-verify-remove when source and destination sit on different volumes.
fn move_file(source: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => copy_then_remove(source, dest),
        Err(e) => Err(e),
    }
}

pub(crate) fn copy_then_remove(source: &Path, dest: &Path) -> io::Result<()> {
    let temp = temp_sibling(dest);
    let copied = (|| {
        let expected = fs::metadata(source)?.len();
        let written = fs::copy(source, &temp)?;
        if written != expected {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("copied {} of {} bytes", written, expected),
            ));
        }
        fs::File::open(&temp)?.sync_all()?;
        fs::rename(&temp, dest)
    })();

    if let Err(e) = copied {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }

    if let Err(e) = fs::remove_file(source) {
        let _ = fs::remove_file(dest);
        return Err(e);
    }
    Ok(())
}

/// An upload reserved in the pending directory.
///
/// Bytes go to a hidden temp file; [`PendingUpload::commit`] moves it into
/// place. Dropping an uncommitted upload removes the temp file.
#[derive(Debug)]
pub struct PendingUpload {
    name: String,
    dest: PathBuf,
    temp: PathBuf,
    committed: bool,
}

impl PendingUpload {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    pub fn commit(mut self) -> StoreResult<MediaFile> {
        if self.dest.exists() {
            return Err(StoreError::AlreadyExists(self.name.clone()));
        }
        fs::rename(&self.temp, &self.dest)?;
        self.committed = true;

        let kind = classify_kind(&self.name)
            .ok_or_else(|| StoreError::InvalidName(self.name.clone()))?;
        tracing::info!(file = %self.name, %kind, "Upload stored in pending");
        Ok(MediaFile {
            name: self.name.clone(),
            kind,
            location: Location::Pending,
        })
    }
}

impl Drop for PendingUpload {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp);
        }
    }
}

/// Filesystem-backed registry of pending and approved media.
#[derive(Debug, Clone)]
pub struct MediaStore {
    layout: MediaLayout,
}

impl MediaStore {
    pub fn new(layout: MediaLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &MediaLayout {
        &self.layout
    }

    pub fn ensure_layout(&self) -> io::Result<()> {
        self.layout.ensure()
    }

    pub fn approved_videos(&self) -> StoreResult<Vec<MediaFile>> {
        list_media(&self.layout.videos, &[MediaKind::Video], Location::Approved)
    }

    pub fn approved_images(&self) -> StoreResult<Vec<MediaFile>> {
        list_media(&self.layout.images, &[MediaKind::Image], Location::Approved)
    }

    pub fn pending_names(&self) -> StoreResult<Vec<String>> {
        list_file_names(&self.layout.pending)
    }

    /// Sorted videos followed by sorted images.
    pub fn approved_names(&self) -> StoreResult<Vec<String>> {
        let mut names = list_file_names(&self.layout.videos)?;
        names.extend(list_file_names(&self.layout.images)?);
        Ok(names)
    }

    /// Validates and reserves `original_name` in the pending directory.
    pub fn begin_upload(&self, original_name: &str) -> StoreResult<PendingUpload> {
        if !is_allowed(original_name) {
            return Err(StoreError::InvalidName(original_name.to_string()));
        }
        let name = sanitize_filename(original_name);
        if !is_allowed(&name) {
            return Err(StoreError::InvalidName(original_name.to_string()));
        }

        let dest = resolve_safe_path(&self.layout.pending, &name)?;
        if dest.exists() {
            return Err(StoreError::AlreadyExists(name));
        }

        Ok(PendingUpload {
            temp: temp_sibling(&dest),
            name,
            dest,
            committed: false,
        })
    }

    pub fn store_upload(&self, original_name: &str, data: &[u8]) -> StoreResult<MediaFile> {
        let upload = self.begin_upload(original_name)?;
        fs::write(upload.temp_path(), data)?;
        upload.commit()
    }

    /// Moves a pending file into the approved directory for its kind.
    pub fn approve(&self, filename: &str) -> StoreResult<MediaFile> {
        let source = resolve_safe_path(&self.layout.pending, filename)?;
        if !source.is_file() {
            return Err(StoreError::NotFound(filename.to_string()));
        }

        let name = file_name_string(&source);
        let kind = classify_kind(&name).ok_or_else(|| StoreError::InvalidName(name.clone()))?;
        let dest = resolve_safe_path(self.layout.approved_dir(kind), &name)?;
        if dest.exists() {
            return Err(StoreError::AlreadyExists(name));
        }

        move_file(&source, &dest).map_err(|e| io_not_found(e, filename))?;
        tracing::info!(file = %name, %kind, "Media approved");

        Ok(MediaFile {
            name,
            kind,
            location: Location::Approved,
        })
    }

    /// Renames a file within its location. Returns the stored name.
    pub fn rename(&self, filename: &str, new_name: &str, location: Location) -> StoreResult<String> {
        let new_name = new_name.trim();
        let clean = sanitize_filename(new_name);
        if new_name.is_empty() || !is_allowed(new_name) || !is_allowed(&clean) {
            return Err(StoreError::InvalidName(new_name.to_string()));
        }

        let source = self.locate(filename, location)?;
        let base = source
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| StoreError::InvalidPath(filename.to_string()))?;

        if location == Location::Approved
            && classify_kind(&clean) != classify_kind(&file_name_string(&source))
        {
            // the listing for the other kind would never show it
            return Err(StoreError::InvalidName(new_name.to_string()));
        }

        let dest = resolve_safe_path(&base, new_name)?;
        if dest.exists() {
            return Err(StoreError::AlreadyExists(clean));
        }

        fs::rename(&source, &dest).map_err(|e| io_not_found(e, filename))?;
        tracing::info!(from = %filename, to = %clean, %location, "Media renamed");
        Ok(clean)
    }

    pub fn delete(&self, filename: &str, location: Location) -> StoreResult<()> {
        let target = self.locate(filename, location)?;
        fs::remove_file(&target).map_err(|e| io_not_found(e, filename))?;
        tracing::info!(file = %filename, %location, "Media deleted");
        Ok(())
    }

    /// Finds an existing file; the approved location checks videos before images.
    fn locate(&self, filename: &str, location: Location) -> StoreResult<PathBuf> {
        let target = match location {
            Location::Pending => resolve_safe_path(&self.layout.pending, filename)?,
            Location::ThumbnailCache => resolve_safe_path(&self.layout.thumbnails, filename)?,
            Location::Approved => {
                let video = resolve_safe_path(&self.layout.videos, filename)?;
                if video.is_file() {
                    video
                } else {
                    resolve_safe_path(&self.layout.images, filename)?
                }
            }
        };

        if !target.is_file() {
            return Err(StoreError::NotFound(filename.to_string()));
        }
        Ok(target)
    }

    /// Approved video path for streaming.
    pub fn video_path(&self, filename: &str) -> StoreResult<PathBuf> {
        self.existing(&self.layout.videos, filename)
    }

    /// Approved image, or a pending one when `include_pending` is set.
    pub fn image_path(&self, filename: &str, include_pending: bool) -> StoreResult<PathBuf> {
        match self.existing(&self.layout.images, filename) {
            Err(StoreError::NotFound(_)) if include_pending => {
                self.existing(&self.layout.pending, filename)
            }
            other => other,
        }
    }

    /// Thumbnail from the primary cache, then the legacy directory, then the default image.
    pub fn thumbnail_path(&self, filename: &str) -> StoreResult<PathBuf> {
        let primary = resolve_safe_path(&self.layout.thumbnails, filename)?;
        if primary.is_file() {
            return Ok(primary);
        }
        if let Ok(legacy) = self.existing(&self.layout.legacy_thumbnails, filename) {
            return Ok(legacy);
        }
        self.existing(&self.layout.images, DEFAULT_THUMBNAIL)
    }

    fn existing(&self, base: &Path, filename: &str) -> StoreResult<PathBuf> {
        let path = resolve_safe_path(base, filename)?;
        if path.is_file() {
            Ok(path)
        } else {
            Err(StoreError::NotFound(filename.to_string()))
        }
    }
}

use crate::services::store::MediaLayout;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MAX_SESSION_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub thumbnails: ThumbnailConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where the `assets/` and `all-pass/` trees live.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default = "default_users_file")]
    pub users_file: String,
    #[serde(default = "default_admin_file")]
    pub admin_file: String,
    #[serde(default = "default_session_lifetime")]
    pub session_lifetime: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users_file: default_users_file(),
            admin_file: default_admin_file(),
            session_lifetime: default_session_lifetime(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_upload")]
    pub max_size: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_upload(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailBackendKind {
    /// In-process decoder when compiled with the `ffmpeg` feature, otherwise the transcoder.
    Auto,
    Library,
    Transcoder,
    Disabled,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThumbnailConfig {
    #[serde(default = "default_backend")]
    pub backend: ThumbnailBackendKind,
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_seek_ms")]
    pub seek_ms: u64,
    #[serde(default = "default_thumb_width")]
    pub width: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            ffmpeg_path: default_ffmpeg_path(),
            timeout_secs: default_timeout_secs(),
            seek_ms: default_seek_ms(),
            width: default_thumb_width(),
        }
    }
}

impl ThumbnailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn seek(&self) -> Duration {
        Duration::from_millis(self.seek_ms)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_users_file() -> String {
    "all-pass/login-pass.json".to_string()
}

fn default_admin_file() -> String {
    "all-pass/adminpass.json".to_string()
}

fn default_session_lifetime() -> String {
    "10h".to_string()
}

fn default_max_upload() -> String {
    "1GB".to_string()
}

fn default_backend() -> ThumbnailBackendKind {
    ThumbnailBackendKind::Auto
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_seek_ms() -> u64 {
    2000
}

fn default_thumb_width() -> u32 {
    400
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Could not read config file '{}': {}. Run 'gallerist init' first?",
                path.display(),
                e
            )
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// A default configuration rooted at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.library.root = root.into();
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.thumbnails.width == 0 {
            anyhow::bail!("thumbnails.width must be greater than 0");
        }
        if self.thumbnails.width > 4096 {
            anyhow::bail!("thumbnails.width must be 4096 or less");
        }
        if self.thumbnails.timeout_secs == 0 {
            anyhow::bail!("thumbnails.timeout_secs must be greater than 0");
        }
        if self.thumbnails.ffmpeg_path.trim().is_empty() {
            anyhow::bail!("thumbnails.ffmpeg_path cannot be empty");
        }
        self.session_lifetime()?;
        self.max_upload_bytes()?;
        Ok(())
    }

    pub fn layout(&self) -> MediaLayout {
        MediaLayout::new(&self.library.root)
    }

    pub fn users_file(&self) -> PathBuf {
        self.library.root.join(&self.auth.users_file)
    }

    pub fn admin_file(&self) -> PathBuf {
        self.library.root.join(&self.auth.admin_file)
    }

    pub fn session_lifetime(&self) -> Result<Duration> {
        let lifetime = parse_duration(&self.auth.session_lifetime)?;
        if lifetime > MAX_SESSION_LIFETIME {
            anyhow::bail!(
                "auth.session_lifetime '{}' exceeds the 365 day maximum",
                self.auth.session_lifetime
            );
        }
        Ok(lifetime)
    }

    pub fn max_upload_bytes(&self) -> Result<usize> {
        parse_size(&self.uploads.max_size)
    }
}

/// Parses `"30m"`, `"10h"`, `"7d"` or a bare number of seconds.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let amount: u64 = digits
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid duration '{}'", value))?;
    let multiplier: u64 = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        other => anyhow::bail!("Unknown duration unit '{}' in '{}'", other, value),
    };
    let seconds = amount
        .checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("Duration '{}' is too large", value))?;
    if seconds == 0 {
        anyhow::bail!("Duration '{}' must be greater than zero", value);
    }
    Ok(Duration::from_secs(seconds))
}

/// Parses `"512KB"`, `"10MB"`, `"1GB"` or a bare byte count.
pub fn parse_size(value: &str) -> Result<usize> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let amount: usize = digits
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid size '{}'", value))?;
    let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "KB" => 1024,
        "MB" => 1024 * 1024,
        "GB" => 1024 * 1024 * 1024,
        other => anyhow::bail!("Unknown size unit '{}' in '{}'", other, value),
    };
    amount
        .checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("Size '{}' is too large", value))
}

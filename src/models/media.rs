use serde::Serialize;
use std::str::FromStr;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Video => VIDEO_EXTENSIONS,
            Self::Image => IMAGE_EXTENSIONS,
        }
    }

    /// Lowercased extension lookup. `None` for anything outside the allow-list.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else {
            None
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Image => write!(f, "image"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Pending,
    Approved,
    ThumbnailCache,
}

impl Location {
    /// Admin forms send `location=pending`; anything else addresses the approved library.
    pub fn from_form(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("pending") => Self::Pending,
            Some(_) => Self::Approved,
        }
    }
}

impl FromStr for Location {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "thumbnail" | "thumbnails" => Ok(Self::ThumbnailCache),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::ThumbnailCache => write!(f, "thumbnail"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaFile {
    pub name: String,
    pub kind: MediaKind,
    pub location: Location,
}

/// Row handed to the home template.
#[derive(Debug, Clone, Serialize)]
pub struct VideoCard {
    pub name: String,
    pub title: String,
    pub thumb: String,
}

/// Row handed to the gallery template.
#[derive(Debug, Clone, Serialize)]
pub struct ImageCard {
    pub name: String,
    pub title: String,
}

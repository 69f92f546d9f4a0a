use std::path::{Path, PathBuf};

use crate::date::CaptureInstant;
use crate::location::PlaceHierarchy;
use crate::metadata::ImageMetadata;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "tiff", "bmp", "webp", "heic", "heif", "svg", "ico", "raw",
];

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "flv", "wmv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a path by its lowercased extension. `None` for anything
    /// that is not a known image or video type.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else {
            None
        }
    }
}

/// Everything learned about one file while it is being organized.
/// Lives for the duration of a single file's processing.
#[derive(Debug, Clone)]
pub struct MediaRecord {
    pub source_path: PathBuf,
    pub media_kind: MediaKind,
    /// Present only for images whose tags could be read
    pub metadata: Option<ImageMetadata>,
    pub capture_instant: Option<CaptureInstant>,
    /// Empty for videos and when location searching is off
    pub place_hierarchy: PlaceHierarchy,
    pub destination_path: Option<PathBuf>,
}

impl MediaRecord {
    pub fn new(source_path: PathBuf, media_kind: MediaKind) -> Self {
        Self {
            source_path,
            media_kind,
            metadata: None,
            capture_instant: None,
            place_hierarchy: PlaceHierarchy::default(),
            destination_path: None,
        }
    }

    /// Lowercased extension including the leading dot, or an empty string.
    pub fn extension(&self) -> String {
        self.source_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default()
    }

    /// One-line summary of what has been decided for this file so far.
    pub fn describe(&self) -> String {
        let taken = self
            .capture_instant
            .map(|t| t.format("%Y-%m-%d %H:%M:%S %:z").to_string())
            .unwrap_or_else(|| "unknown time".to_string());
        let destination = self
            .destination_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "undecided".to_string());
        format!(
            "{} ({:?}, {}) -> {}",
            self.source_path.display(),
            self.media_kind,
            taken,
            destination
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_extensions() {
        assert_eq!(MediaKind::from_path(Path::new("a/IMG_0001.JPG")), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_path(Path::new("b.heic")), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_path(Path::new("clip.MkV")), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(MediaKind::from_path(Path::new("no_extension")), None);
        // .mov is not in the table
        assert_eq!(MediaKind::from_path(Path::new("clip.mov")), None);
    }

    #[test]
    fn test_record_extension_is_lowercased() {
        let record = MediaRecord::new(PathBuf::from("/tmp/Photo.JPEG"), MediaKind::Image);
        assert_eq!(record.extension(), ".jpeg");
        assert!(record.place_hierarchy.is_empty());
    }

    #[test]
    fn test_describe_reports_decisions() {
        let mut record = MediaRecord::new(PathBuf::from("/tmp/a.jpg"), MediaKind::Image);
        assert_eq!(record.describe(), "/tmp/a.jpg (Image, unknown time) -> undecided");

        let taken = chrono::DateTime::from_timestamp(0, 0)
            .unwrap()
            .with_timezone(&chrono::Local);
        record.capture_instant = Some(taken);
        record.destination_path = Some(PathBuf::from("/tmp/out.jpg"));
        let described = record.describe();
        assert!(described.contains(&taken.format("%Y-%m-%d %H:%M:%S").to_string()));
        assert!(described.ends_with("-> /tmp/out.jpg"));
    }
}

pub mod exif;
pub mod filesystem;

use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use chrono_tz::Tz;

use crate::media::MediaKind;
use crate::metadata::ImageMetadata;

/// Default file name pattern, e.g. `2023_07_04_T13_05_09`
pub const DEFAULT_NAMING_FORMAT: &str = "%Y_%m_%d_T%H_%M_%S";

/// Best-effort moment a media file was created. Embedded EXIF times carry no
/// zone and are taken as local wall-clock time.
pub type CaptureInstant = DateTime<Local>;

#[derive(Debug, thiserror::Error)]
pub enum TimestampError {
    #[error("cannot read file times of {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no usable timestamp for {0}")]
    Unavailable(PathBuf),
    #[error("invalid naming format {0:?}")]
    InvalidFormat(String),
}

/// Where a capture instant came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    Embedded,
    Filesystem,
}

pub struct DateResult {
    pub instant: CaptureInstant,
    pub source: TimestampSource,
}

/// Resolve the capture instant of one file, trying sources in priority order.
pub fn resolve(
    path: &Path,
    media_kind: MediaKind,
    metadata: Option<&ImageMetadata>,
) -> Result<DateResult, TimestampError> {
    // 1. Embedded DateTimeOriginal (images only)
    if media_kind == MediaKind::Image {
        if let Some(instant) = metadata.and_then(exif::embedded_capture_instant) {
            return Ok(DateResult {
                instant,
                source: TimestampSource::Embedded,
            });
        }
    }

    // 2. Oldest of birth / modification / access time
    let instant = filesystem::oldest_file_time(path)
        .map_err(|source| TimestampError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TimestampError::Unavailable(path.to_path_buf()))?;

    Ok(DateResult {
        instant,
        source: TimestampSource::Filesystem,
    })
}

/// Render an instant as a file stem, in `time_zone` if given, else local time.
pub fn format_instant(
    instant: &CaptureInstant,
    time_zone: Option<Tz>,
    naming_format: Option<&str>,
) -> Result<String, TimestampError> {
    let pattern = naming_format.unwrap_or(DEFAULT_NAMING_FORMAT);
    validate_naming_format(pattern)?;

    let mut out = String::new();
    let written = match time_zone {
        Some(tz) => write!(out, "{}", instant.with_timezone(&tz).format(pattern)),
        None => write!(out, "{}", instant.format(pattern)),
    };
    written.map_err(|_| TimestampError::InvalidFormat(pattern.to_string()))?;
    Ok(out)
}

/// Reject strftime patterns chrono cannot render, and patterns that would
/// produce path separators inside a file name.
pub fn validate_naming_format(pattern: &str) -> Result<(), TimestampError> {
    let broken = pattern.is_empty()
        || pattern.contains(['/', '\\'])
        || StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error));
    if broken {
        return Err(TimestampError::InvalidFormat(pattern.to_string()));
    }
    Ok(())
}

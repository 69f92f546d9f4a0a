use std::path::{Path, PathBuf};

use crate::location::PlaceHierarchy;

/// Where a file should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub path: PathBuf,
    /// The file already has this name in this directory
    pub unchanged: bool,
}

/// Build the destination of one file.
///
/// The file name is `formatted_timestamp + extension`. With a non-empty place
/// hierarchy the directory is `base_directory/country/region/municipality/city`
/// (skipping missing levels and levels that repeat their parent); otherwise
/// the file is renamed where it is.
pub fn compose(
    base_directory: &Path,
    source_path: &Path,
    formatted_timestamp: &str,
    extension: &str,
    place: &PlaceHierarchy,
) -> Destination {
    let file_name = format!("{}{}", formatted_timestamp, extension.to_lowercase());
    let original_parent = source_path.parent().unwrap_or(base_directory);

    let segments = place.segments();
    let directory = if segments.is_empty() {
        original_parent.to_path_buf()
    } else {
        segments
            .iter()
            .fold(base_directory.to_path_buf(), |dir, segment| dir.join(segment))
    };

    let unchanged = directory == original_parent
        && source_path.file_name().and_then(|n| n.to_str()) == Some(file_name.as_str());

    Destination {
        path: directory.join(file_name),
        unchanged,
    }
}

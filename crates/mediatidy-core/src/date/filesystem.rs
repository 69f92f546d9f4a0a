use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Local};
use filetime::FileTime;

use super::CaptureInstant;

/// Earliest of birth time (where the platform records one), modification time
/// and access time. Copy and sync tools tend to reset one or two of them, so
/// the minimum is the closest thing to "first seen".
pub fn oldest_file_time(path: &Path) -> io::Result<Option<CaptureInstant>> {
    let meta = fs::metadata(path)?;

    let candidates = [
        FileTime::from_creation_time(&meta),
        Some(FileTime::from_last_modification_time(&meta)),
        Some(FileTime::from_last_access_time(&meta)),
    ];

    Ok(candidates.into_iter().flatten().min().and_then(to_local))
}

fn to_local(ft: FileTime) -> Option<CaptureInstant> {
    let utc = DateTime::from_timestamp(ft.unix_seconds(), ft.nanoseconds())?;
    Some(utc.with_timezone(&Local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_oldest_is_not_after_any_file_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, b"x").unwrap();

        let atime = FileTime::from_unix_time(1_600_000_000, 0);
        let mtime = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_times(&path, atime, mtime).unwrap();

        let oldest = oldest_file_time(&path).unwrap().unwrap();
        let meta = fs::metadata(&path).unwrap();
        let mut inputs = vec![
            FileTime::from_last_modification_time(&meta),
            FileTime::from_last_access_time(&meta),
        ];
        inputs.extend(FileTime::from_creation_time(&meta));

        for ft in inputs {
            assert!(oldest.timestamp() <= ft.unix_seconds());
        }
        assert_eq!(oldest.timestamp(), 1_500_000_000);
    }

    #[test]
    fn test_access_time_can_be_the_oldest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.png");
        fs::write(&path, b"x").unwrap();

        let atime = FileTime::from_unix_time(1_000_000_000, 0);
        let mtime = FileTime::from_unix_time(1_200_000_000, 0);
        filetime::set_file_times(&path, atime, mtime).unwrap();

        let oldest = oldest_file_time(&path).unwrap().unwrap();
        assert_eq!(oldest.timestamp(), 1_000_000_000);
    }
}

use chrono::{Local, NaiveDateTime, TimeZone};

use super::CaptureInstant;
use crate::metadata::ImageMetadata;

/// Capture instant from the embedded `DateTimeOriginal` tag, if it parses.
pub fn embedded_capture_instant(metadata: &ImageMetadata) -> Option<CaptureInstant> {
    let raw = metadata.date_time_original.as_deref()?;
    let naive = parse_exif_datetime(raw)?;
    Some(
        Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap_or_else(|| Local.from_utc_datetime(&naive)),
    )
}

/// Strict `YYYY:MM:DD HH:MM:SS`; anything else is treated as absent.
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    match NaiveDateTime::parse_from_str(s.trim(), "%Y:%m:%d %H:%M:%S") {
        Ok(dt) => Some(dt),
        Err(e) => {
            log::debug!("ignoring malformed DateTimeOriginal {:?}: {}", s, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_exif_datetime() {
        let dt = parse_exif_datetime("2023:07:04 13:05:09").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 7, 4));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (13, 5, 9));

        assert!(parse_exif_datetime("2023-07-04 13:05:09").is_none());
        assert!(parse_exif_datetime("2023:07:04").is_none());
        assert!(parse_exif_datetime("0000:00:00 00:00:00").is_none());
        assert!(parse_exif_datetime("").is_none());
    }

    #[test]
    fn test_missing_tag() {
        assert!(embedded_capture_instant(&ImageMetadata::default()).is_none());
    }

    #[test]
    fn test_embedded_instant_keeps_wall_clock() {
        let metadata = ImageMetadata {
            date_time_original: Some("2021:12:31 23:59:58".to_string()),
            ..Default::default()
        };
        let instant = embedded_capture_instant(&metadata).unwrap();
        assert_eq!(instant.format("%Y %m %d %H %M %S").to_string(), "2021 12 31 23 59 58");
    }
}

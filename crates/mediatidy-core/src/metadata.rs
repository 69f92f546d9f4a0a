use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{Exif, In, Rational, Reader, Tag, Value};

/// The embedded tags the organizer cares about, pulled out of an image once.
/// Any tag that is missing or has an unexpected shape is `None`.
#[derive(Debug, Clone, Default)]
pub struct ImageMetadata {
    /// Raw `DateTimeOriginal` text, e.g. `2023:07:04 13:05:09`
    pub date_time_original: Option<String>,
    pub gps_latitude: Option<[Rational; 3]>,
    pub gps_latitude_ref: Option<String>,
    pub gps_longitude: Option<[Rational; 3]>,
    pub gps_longitude_ref: Option<String>,
}

impl ImageMetadata {
    pub fn from_exif(exif: &Exif) -> Self {
        Self {
            date_time_original: ascii_field(exif, Tag::DateTimeOriginal),
            gps_latitude: dms_field(exif, Tag::GPSLatitude),
            gps_latitude_ref: ascii_field(exif, Tag::GPSLatitudeRef),
            gps_longitude: dms_field(exif, Tag::GPSLongitude),
            gps_longitude_ref: ascii_field(exif, Tag::GPSLongitudeRef),
        }
    }
}

/// Read embedded EXIF tags from an image file.
pub fn read_image_metadata(path: &Path) -> Result<ImageMetadata, exif::Error> {
    let file = File::open(path)?;
    let exif = Reader::new().read_from_container(&mut BufReader::new(file))?;
    Ok(ImageMetadata::from_exif(&exif))
}

fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Ascii(ref parts) => {
            let raw = parts.first()?;
            let text = String::from_utf8_lossy(raw).trim_end_matches('\0').trim().to_string();
            (!text.is_empty()).then_some(text)
        }
        _ => None,
    }
}

fn dms_field(exif: &Exif, tag: Tag) -> Option<[Rational; 3]> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Rational(ref v) if v.len() >= 3 => {
            if v[..3].iter().any(|r| r.denom == 0) {
                return None;
            }
            Some([v[0], v[1], v[2]])
        }
        _ => None,
    }
}

#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use mediatidy_core::geocode::{Address, GeocodeError, ReverseGeocoder};

/// Roughly Syntagma square
pub const ATHENS_GPS: ([u32; 3], [u32; 3]) = ([37, 58, 32], [23, 44, 4]);

fn ascii(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

fn dms(tag: Tag, [d, m, s]: [u32; 3]) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(vec![
            Rational { num: d, denom: 1 },
            Rational { num: m, denom: 1 },
            Rational { num: s, denom: 1 },
        ]),
    }
}

/// A minimal JPEG whose only content is an APP1 EXIF segment.
pub fn jpeg_with_exif(taken: Option<&str>, gps: Option<([u32; 3], [u32; 3])>) -> Vec<u8> {
    let mut fields = vec![ascii(Tag::Make, "mediatidy-test")];
    if let Some(taken) = taken {
        fields.push(ascii(Tag::DateTimeOriginal, taken));
    }
    if let Some((lat, lon)) = gps {
        fields.push(dms(Tag::GPSLatitude, lat));
        fields.push(ascii(Tag::GPSLatitudeRef, "N"));
        fields.push(dms(Tag::GPSLongitude, lon));
        fields.push(ascii(Tag::GPSLongitudeRef, "E"));
    }

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let segment_len = u16::try_from(2 + 6 + tiff.len()).unwrap();
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

pub fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

/// Answers every lookup with the same address and counts calls.
pub struct FixedGeocoder {
    pub address: Option<Address>,
    pub calls: Cell<u32>,
}

impl FixedGeocoder {
    pub fn athens() -> Self {
        Self {
            address: Some(Address {
                city: Some("Athens".to_string()),
                state: Some("Athens".to_string()),
                country: Some("Greece".to_string()),
                ..Default::default()
            }),
            calls: Cell::new(0),
        }
    }
}

impl ReverseGeocoder for FixedGeocoder {
    fn reverse(&self, _: f64, _: f64) -> Result<Option<Address>, GeocodeError> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.address.clone())
    }
}

/// Fails every lookup with a non-timeout error.
pub struct UnreachableGeocoder;

impl ReverseGeocoder for UnreachableGeocoder {
    fn reverse(&self, _: f64, _: f64) -> Result<Option<Address>, GeocodeError> {
        Err(GeocodeError::Request("connection refused".to_string()))
    }
}

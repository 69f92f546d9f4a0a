use std::sync::LazyLock;

use exif::Rational;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::geocode::{Address, GeocodeError, ReverseGeocoder};
use crate::metadata::ImageMetadata;

/// Timeouts are retried this many times after the first attempt.
pub const MAX_GEOCODE_RETRIES: u32 = 3;

/// Administrative boilerplate dropped from place names
const STOPWORDS: &[&str] = &[
    "village",
    "town",
    "city",
    "suburb",
    "municipal",
    "unit",
    "of",
    "municipality",
    "country",
    "state",
    "state_district",
    "region",
    "regional",
];

const CITY_TAGS: &[&str] = &["village", "town", "city"];
const MUNICIPALITY_TAGS: &[&str] = &["suburb", "municipal", "municipality"];
const REGION_TAGS: &[&str] = &["state", "state_district", "county"];

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\-/]+").unwrap());
static INVALID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Raw place names as the geocoder returned them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceComponents {
    pub city: Option<String>,
    pub municipality: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl PlaceComponents {
    pub fn from_address(address: &Address) -> Self {
        Self {
            city: first_present(address, CITY_TAGS),
            municipality: first_present(address, MUNICIPALITY_TAGS),
            region: first_present(address, REGION_TAGS),
            country: address.country.clone().filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.municipality.is_none()
            && self.region.is_none()
            && self.country.is_none()
    }
}

fn first_present(address: &Address, tags: &[&str]) -> Option<String> {
    tags.iter()
        .filter_map(|tag| address.tag(tag))
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Normalized place names, finest first in field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceHierarchy {
    pub city: Option<String>,
    pub municipality: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl PlaceHierarchy {
    pub fn from_components(components: &PlaceComponents) -> Self {
        Self {
            city: normalize(components.city.as_deref()),
            municipality: normalize(components.municipality.as_deref()),
            region: normalize(components.region.as_deref()),
            country: normalize(components.country.as_deref()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments().is_empty()
    }

    /// Directory segments from coarsest to finest. A level equal to the
    /// segment just before it is skipped.
    pub fn segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = Vec::with_capacity(4);
        let levels = [&self.country, &self.region, &self.municipality, &self.city];
        for level in levels.into_iter().flatten() {
            if segments.last() != Some(&level.as_str()) {
                segments.push(level.as_str());
            }
        }
        segments
    }
}

/// GPS position from EXIF, `None` unless both latitude and longitude exist.
pub fn extract_coordinates(metadata: &ImageMetadata) -> Option<Coordinates> {
    let latitude = dms_to_degrees(metadata.gps_latitude.as_ref()?);
    let longitude = dms_to_degrees(metadata.gps_longitude.as_ref()?);

    Some(Coordinates {
        latitude: if metadata.gps_latitude_ref.as_deref() == Some("N") {
            latitude
        } else {
            -latitude
        },
        longitude: if metadata.gps_longitude_ref.as_deref() == Some("E") {
            longitude
        } else {
            -longitude
        },
    })
}

pub fn dms_to_degrees(dms: &[Rational; 3]) -> f64 {
    dms[0].to_f64() + dms[1].to_f64() / 60.0 + dms[2].to_f64() / 3600.0
}

/// Look up the place for `coordinates`. Timeouts are retried up to
/// [`MAX_GEOCODE_RETRIES`] times; after that the place is unknown rather than
/// an error. Other failures are returned to the caller.
pub fn reverse_geocode(
    geocoder: &dyn ReverseGeocoder,
    coordinates: Option<Coordinates>,
) -> Result<PlaceComponents, GeocodeError> {
    let Some(Coordinates {
        latitude,
        longitude,
    }) = coordinates
    else {
        return Ok(PlaceComponents::default());
    };

    let attempts = MAX_GEOCODE_RETRIES + 1;
    for attempt in 1..=attempts {
        match geocoder.reverse(latitude, longitude) {
            Ok(Some(address)) => return Ok(PlaceComponents::from_address(&address)),
            Ok(None) => return Ok(PlaceComponents::default()),
            Err(GeocodeError::Timeout) => {
                log::warn!(
                    "Reverse geocoding ({:.5}, {:.5}) timed out, attempt {}/{}",
                    latitude,
                    longitude,
                    attempt,
                    attempts
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(PlaceComponents::default())
}

/// Lowercase ASCII token usable as a directory name, or `None` if nothing
/// survives the cleanup.
pub fn normalize(component: Option<&str>) -> Option<String> {
    let composed: String = component?.trim().nfc().collect();
    let ascii = deunicode::deunicode(&composed).to_lowercase();

    let words: Vec<String> = SEPARATOR_RE
        .split(ascii.trim())
        .map(|w| INVALID_RE.replace_all(w, "").into_owned())
        .filter(|w| !w.is_empty() && !STOPWORDS.contains(&w.as_str()))
        .collect();

    let token = words.join("_");
    (!token.is_empty()).then_some(token)
}

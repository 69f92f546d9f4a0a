use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = concat!("mediatidy/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("reverse geocoding timed out")]
    Timeout,
    #[error("reverse geocoding request failed: {0}")]
    Request(String),
    #[error("cannot decode reverse geocoding response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GeocodeError::Timeout
        } else {
            GeocodeError::Request(e.to_string())
        }
    }
}

/// Structured address of a reverse geocoding hit. Only the tags the organizer
/// reads are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Address {
    pub village: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub suburb: Option<String>,
    pub municipal: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub state_district: Option<String>,
    pub county: Option<String>,
    pub country: Option<String>,
}

impl Address {
    /// Look up an address tag by its Nominatim name.
    pub fn tag(&self, name: &str) -> Option<&str> {
        let value = match name {
            "village" => &self.village,
            "town" => &self.town,
            "city" => &self.city,
            "suburb" => &self.suburb,
            "municipal" => &self.municipal,
            "municipality" => &self.municipality,
            "state" => &self.state,
            "state_district" => &self.state_district,
            "county" => &self.county,
            "country" => &self.country,
            _ => return None,
        };
        value.as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<Address>,
}

/// Turns coordinates into an address. `Ok(None)` means the service answered
/// but had no structured address for the point.
pub trait ReverseGeocoder {
    fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<Address>, GeocodeError>;
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Base URL of a Nominatim compatible service
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Blocking client for the Nominatim `/reverse` endpoint, answers in English.
pub struct NominatimGeocoder {
    client: Client,
    endpoint: Url,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        let endpoint = Url::parse(&format!("{}/reverse", config.base_url.trim_end_matches('/')))?;
        Ok(Self { client, endpoint })
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<Address>, GeocodeError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("lat", &latitude.to_string())
            .append_pair("lon", &longitude.to_string())
            .append_pair("accept-language", "en");

        let body = self.client.get(url).send()?.error_for_status()?.text()?;
        parse_reverse_response(&body)
    }
}

fn parse_reverse_response(body: &str) -> Result<Option<Address>, GeocodeError> {
    let response: ReverseResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Decode(e.to_string()))?;
    Ok(response.address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let body = r#"{
            "place_id": 1,
            "display_name": "Athens, Greece",
            "address": {
                "city": "Athens",
                "municipality": "Municipality of Athens",
                "state": "Attica",
                "country": "Greece",
                "country_code": "gr"
            }
        }"#;
        let address = parse_reverse_response(body).unwrap().unwrap();
        assert_eq!(address.city.as_deref(), Some("Athens"));
        assert_eq!(address.state.as_deref(), Some("Attica"));
        assert_eq!(address.country.as_deref(), Some("Greece"));
        assert!(address.village.is_none());
        assert_eq!(address.tag("municipality"), Some("Municipality of Athens"));
        assert_eq!(address.tag("postcode"), None);
    }

    #[test]
    fn test_no_address_in_response() {
        let body = r#"{"error": "Unable to geocode"}"#;
        assert!(parse_reverse_response(body).unwrap().is_none());
    }

    #[test]
    fn test_garbage_response() {
        assert!(matches!(
            parse_reverse_response("<html>"),
            Err(GeocodeError::Decode(_))
        ));
    }

    #[test]
    fn test_endpoint_from_config() {
        let config = GeocoderConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..Default::default()
        };
        let geocoder = NominatimGeocoder::new(&config).unwrap();
        assert_eq!(geocoder.endpoint.as_str(), "http://localhost:8080/reverse");
    }
}

//! LocationIQ geocoding provider.
//!
//! # URL Pattern
//!
//! `https://us1.locationiq.com/v1/search?key=..&q=..&countrycodes=id&format=json&limit=1`
//!
//! # Response Shape
//!
//! A JSON array of places, best match first. Coordinates are usually
//! decimal strings:
//!
//! ```json
//! [ { "lat": "-6.1944", "lon": "106.8229", "display_name": "..." } ]
//! ```
//!
//! Any body that is not a non-empty array is reported as "No results found".
//! LocationIQ answers unknown addresses with 404, which is reported as a
//! regular API error.

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::provider::{
    status_outcome, AsyncHttpClient, GeocodeOutcome, GeocodeProvider, ProviderError, ProviderId,
};

/// Search endpoint of the US region.
pub const LOCATIONIQ_BASE_URL: &str = "https://us1.locationiq.com/v1/search";

/// A coordinate that may arrive as a JSON string or number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Text(String),
    Number(f64),
}

impl Coordinate {
    fn value(&self) -> Option<f64> {
        match self {
            Coordinate::Text(s) => s.trim().parse().ok(),
            Coordinate::Number(n) => Some(*n),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LocationIqPlace {
    lat: Coordinate,
    lon: Coordinate,
    #[serde(default)]
    display_name: String,
}

/// LocationIQ geocoding adapter.
pub struct LocationIqProvider<C: AsyncHttpClient> {
    http_client: C,
    base_url: String,
    country_codes: String,
}

impl<C: AsyncHttpClient> LocationIqProvider<C> {
    /// Creates a LocationIQ provider restricted to Indonesia.
    pub fn new(http_client: C) -> Self {
        Self {
            http_client,
            base_url: LOCATIONIQ_BASE_URL.to_string(),
            country_codes: "id".to_string(),
        }
    }

    /// Overrides the endpoint URL (used for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the comma separated country code filter.
    pub fn with_country_codes(mut self, country_codes: impl Into<String>) -> Self {
        self.country_codes = country_codes.into();
        self
    }

    fn build_url(&self, address: &str, key: &str) -> Result<String, ProviderError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("key", key)
            .append_pair("q", address)
            .append_pair("countrycodes", &self.country_codes)
            .append_pair("format", "json")
            .append_pair("limit", "1");

        Ok(url.into())
    }

    fn parse_body(body: &[u8]) -> GeocodeOutcome {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                return GeocodeOutcome::failure(ProviderError::InvalidBody(e.to_string()).to_string())
            }
        };

        let first = match value {
            Value::Array(mut places) if !places.is_empty() => places.swap_remove(0),
            _ => return GeocodeOutcome::no_results(),
        };

        let place: LocationIqPlace = match serde_json::from_value(first) {
            Ok(place) => place,
            Err(e) => {
                return GeocodeOutcome::failure(ProviderError::InvalidBody(e.to_string()).to_string())
            }
        };

        match (place.lat.value(), place.lon.value()) {
            (Some(latitude), Some(longitude)) => {
                GeocodeOutcome::found(latitude, longitude, place.display_name)
            }
            _ => GeocodeOutcome::failure(
                ProviderError::InvalidBody("unparseable coordinates".to_string()).to_string(),
            ),
        }
    }
}

impl<C: AsyncHttpClient> GeocodeProvider for LocationIqProvider<C> {
    async fn resolve(&self, address: &str, credential: &str) -> GeocodeOutcome {
        let url = match self.build_url(address, credential) {
            Ok(url) => url,
            Err(e) => return GeocodeOutcome::failure(e.to_string()),
        };

        let response = match self.http_client.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                warn!(provider = "locationiq", error = %e, "Geocoding request failed");
                return GeocodeOutcome::failure(e.to_string());
            }
        };

        if let Some(outcome) = status_outcome(self.name(), response.status) {
            debug!(provider = "locationiq", status = response.status, "Non-success status");
            return outcome;
        }

        Self::parse_body(&response.body)
    }

    fn id(&self) -> ProviderId {
        ProviderId::LocationIq
    }
}

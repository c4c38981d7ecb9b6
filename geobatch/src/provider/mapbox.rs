//! Mapbox geocoding provider.
//!
//! Uses the permanent geocoding endpoint, which costs the same as the
//! temporary one on the free tier and allows results to be stored.
//!
//! # URL Pattern
//!
//! `https://api.mapbox.com/geocoding/v5/mapbox.places-permanent/{address}.json?access_token=..`
//!
//! - The address is a percent-encoded path segment
//! - `limit=1`: only the best match is requested
//! - `types=address,place,locality,neighborhood,postcode`: skip POIs and regions
//! - `country` / `language` bias results toward the configured region
//!
//! # Response Shape
//!
//! ```json
//! { "features": [ { "center": [106.82, -6.17], "place_name": "..." } ] }
//! ```
//!
//! Note that `center` is `[longitude, latitude]`.
//!
//! # Caching
//!
//! Outcomes are memoized by normalized address in a bounded
//! [`GeocodeCache`]. Successful and "no results" outcomes are cached;
//! throttled and failed requests are not, so they are retried on the next
//! lookup.

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cache::{CacheStats, GeocodeCache, CACHE_MAX_SIZE};
use crate::provider::{
    status_outcome, AsyncHttpClient, GeocodeOutcome, GeocodeProvider, ProviderError, ProviderId,
    NO_RESULTS_MESSAGE,
};

/// Base URL for the permanent geocoding endpoint.
pub const MAPBOX_BASE_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places-permanent";

/// Feature types requested from Mapbox.
const MAPBOX_TYPES: &str = "address,place,locality,neighborhood,postcode";

#[derive(Debug, Deserialize)]
struct MapboxResponse {
    #[serde(default)]
    features: Vec<MapboxFeature>,
}

#[derive(Debug, Deserialize)]
struct MapboxFeature {
    center: [f64; 2],
    place_name: String,
}

/// Mapbox geocoding adapter with a bounded result cache.
///
/// # Example
///
/// ```ignore
/// use geobatch::provider::{AsyncReqwestClient, GeocodeProvider, MapboxProvider};
///
/// let provider = MapboxProvider::new(AsyncReqwestClient::new()?);
/// let outcome = provider.resolve("Jl. Sudirman 1, Jakarta", "pk.token").await;
/// ```
pub struct MapboxProvider<C: AsyncHttpClient> {
    http_client: C,
    base_url: String,
    country: String,
    language: String,
    limit: u32,
    cache: GeocodeCache,
}

impl<C: AsyncHttpClient> MapboxProvider<C> {
    /// Creates a Mapbox provider with default region settings (Indonesia).
    pub fn new(http_client: C) -> Self {
        Self {
            http_client,
            base_url: MAPBOX_BASE_URL.to_string(),
            country: "ID".to_string(),
            language: "id".to_string(),
            limit: 1,
            cache: GeocodeCache::new(CACHE_MAX_SIZE),
        }
    }

    /// Overrides the endpoint base URL (used for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the ISO 3166 country filter.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Sets the result language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Replaces the cache with one bounded to `max_size` entries.
    pub fn with_cache_size(mut self, max_size: usize) -> Self {
        self.cache = GeocodeCache::new(max_size);
        self
    }

    /// Returns cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drops every cached outcome.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Builds the request URL for an address.
    fn build_url(&self, address: &str, access_token: &str) -> Result<String, ProviderError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(&format!("{}.json", address));

        url.query_pairs_mut()
            .append_pair("access_token", access_token)
            .append_pair("country", &self.country)
            .append_pair("limit", &self.limit.to_string())
            .append_pair("types", MAPBOX_TYPES)
            .append_pair("language", &self.language);

        Ok(url.into())
    }

    /// Performs the network lookup without touching the cache.
    async fn fetch(&self, address: &str, access_token: &str) -> GeocodeOutcome {
        let url = match self.build_url(address, access_token) {
            Ok(url) => url,
            Err(e) => return GeocodeOutcome::failure(e.to_string()),
        };

        let response = match self.http_client.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                warn!(provider = "mapbox", error = %e, "Geocoding request failed");
                return GeocodeOutcome::failure(e.to_string());
            }
        };

        if let Some(outcome) = status_outcome(self.name(), response.status) {
            debug!(provider = "mapbox", status = response.status, "Non-success status");
            return outcome;
        }

        match serde_json::from_slice::<MapboxResponse>(&response.body) {
            Ok(body) => match body.features.into_iter().next() {
                Some(feature) => {
                    let [longitude, latitude] = feature.center;
                    GeocodeOutcome::found(latitude, longitude, feature.place_name)
                }
                None => GeocodeOutcome::no_results(),
            },
            Err(e) => GeocodeOutcome::failure(ProviderError::InvalidBody(e.to_string()).to_string()),
        }
    }
}

/// Returns true for outcomes worth remembering: hits and known-bad addresses.
fn is_cacheable(outcome: &GeocodeOutcome) -> bool {
    !outcome.retryable
        && (outcome.is_success() || outcome.error.as_deref() == Some(NO_RESULTS_MESSAGE))
}

impl<C: AsyncHttpClient> GeocodeProvider for MapboxProvider<C> {
    async fn resolve(&self, address: &str, credential: &str) -> GeocodeOutcome {
        if let Some(hit) = self.cache.get(address) {
            debug!(provider = "mapbox", "Cache hit");
            return hit;
        }

        let outcome = self.fetch(address, credential).await;
        if is_cacheable(&outcome) {
            self.cache.put(address, outcome.clone());
        }
        outcome
    }

    fn id(&self) -> ProviderId {
        ProviderId::Mapbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{HttpResponse, MockAsyncHttpClient};

    const JAKARTA_BODY: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "center": [106.8229, -6.1944], "place_name": "Jalan Sudirman, Jakarta, Indonesia" },
            { "center": [0.0, 0.0], "place_name": "Somewhere else" }
        ]
    }"#;

    fn provider(mock: MockAsyncHttpClient) -> MapboxProvider<MockAsyncHttpClient> {
        MapboxProvider::new(mock)
    }

    #[test]
    fn test_provider_name() {
        let provider = provider(MockAsyncHttpClient::default());
        assert_eq!(provider.name(), "Mapbox");
        assert_eq!(provider.id(), ProviderId::Mapbox);
    }

    #[test]
    fn test_url_construction() {
        let provider = provider(MockAsyncHttpClient::default());
        let url = provider.build_url("Jl. Sudirman 1", "pk.test").unwrap();

        assert!(url.starts_with(
            "https://api.mapbox.com/geocoding/v5/mapbox.places-permanent/Jl.%20Sudirman%201.json?"
        ));
        assert!(url.contains("access_token=pk.test"));
        assert!(url.contains("country=ID"));
        assert!(url.contains("limit=1"));
        assert!(url.contains("types=address%2Cplace%2Clocality%2Cneighborhood%2Cpostcode"));
        assert!(url.contains("language=id"));
    }

    #[test]
    fn test_url_encodes_slashes_in_address() {
        let provider = provider(MockAsyncHttpClient::default());
        let url = provider.build_url("RT 01/RW 02", "t").unwrap();
        assert!(url.contains("/RT%2001%2FRW%2002.json?"));
    }

    #[test]
    fn test_url_custom_region() {
        let provider = provider(MockAsyncHttpClient::default())
            .with_base_url("http://localhost:9000/geocode/")
            .with_country("DE")
            .with_language("de");
        let url = provider.build_url("Berlin", "t").unwrap();
        assert!(url.starts_with("http://localhost:9000/geocode/Berlin.json?"));
        assert!(url.contains("country=DE"));
        assert!(url.contains("language=de"));
    }

    #[tokio::test]
    async fn test_resolve_success_takes_first_feature() {
        let mock = MockAsyncHttpClient::with_response(200, JAKARTA_BODY);
        let provider = provider(mock);

        let outcome = provider.resolve("Jl. Sudirman", "t").await;
        assert_eq!(outcome.latitude, Some(-6.1944));
        assert_eq!(outcome.longitude, Some(106.8229));
        assert_eq!(
            outcome.formatted_address.as_deref(),
            Some("Jalan Sudirman, Jakarta, Indonesia")
        );
        assert!(outcome.error.is_none());
        assert!(!outcome.cached);
    }

    #[tokio::test]
    async fn test_resolve_no_results() {
        let mock = MockAsyncHttpClient::with_response(200, r#"{"features": []}"#);
        let provider = provider(mock);

        let outcome = provider.resolve("nowhere", "t").await;
        assert_eq!(outcome.error.as_deref(), Some("No results found"));
        assert!(!outcome.retryable);
        assert_eq!(outcome.latitude, None);
    }

    #[tokio::test]
    async fn test_resolve_rate_limited_is_retryable() {
        let mock = MockAsyncHttpClient::with_response(429, "");
        let provider = provider(mock);

        let outcome = provider.resolve("Jakarta", "t").await;
        assert!(outcome.retryable);
        assert_eq!(outcome.error.as_deref(), Some("Rate limit exceeded"));
    }

    #[tokio::test]
    async fn test_resolve_http_error() {
        let mock = MockAsyncHttpClient::with_response(401, r#"{"message":"Not Authorized"}"#);
        let provider = provider(mock);

        let outcome = provider.resolve("Jakarta", "bad").await;
        assert_eq!(outcome.error.as_deref(), Some("Mapbox API error: 401"));
        assert!(!outcome.retryable);
    }

    #[tokio::test]
    async fn test_resolve_transport_error_becomes_outcome() {
        let mock =
            MockAsyncHttpClient::with_error(ProviderError::Transport("dns failure".to_string()));
        let provider = provider(mock);

        let outcome = provider.resolve("Jakarta", "t").await;
        assert!(outcome.error.unwrap().contains("dns failure"));
        assert!(!outcome.retryable);
    }

    #[tokio::test]
    async fn test_resolve_malformed_body() {
        let mock = MockAsyncHttpClient::with_response(200, "<html>oops</html>");
        let provider = provider(mock);

        let outcome = provider.resolve("Jakarta", "t").await;
        assert!(outcome.error.unwrap().starts_with("Invalid response body"));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let mock = MockAsyncHttpClient::with_response(200, JAKARTA_BODY);
        let provider = provider(mock.clone());

        let first = provider.resolve("Jl. Sudirman", "t").await;
        let second = provider.resolve("  jl.   SUDIRMAN ", "t").await;

        assert_eq!(mock.request_count(), 1);
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.latitude, second.latitude);
        assert_eq!(first.longitude, second.longitude);
        assert_eq!(first.formatted_address, second.formatted_address);
    }

    #[tokio::test]
    async fn test_no_results_are_cached() {
        let mock = MockAsyncHttpClient::with_response(200, r#"{"features": []}"#);
        let provider = provider(mock.clone());

        provider.resolve("nowhere", "t").await;
        let second = provider.resolve("nowhere", "t").await;

        assert_eq!(mock.request_count(), 1);
        assert!(second.cached);
        assert_eq!(second.error.as_deref(), Some("No results found"));
    }

    #[tokio::test]
    async fn test_rate_limited_not_cached() {
        let mock = MockAsyncHttpClient::new(vec![
            Ok(HttpResponse::new(429, "")),
            Ok(HttpResponse::new(200, JAKARTA_BODY)),
        ]);
        let provider = provider(mock.clone());

        assert!(provider.resolve("Jakarta", "t").await.retryable);
        let outcome = provider.resolve("Jakarta", "t").await;

        assert_eq!(mock.request_count(), 2);
        assert!(outcome.is_success());
        assert!(!outcome.cached);
    }

    #[tokio::test]
    async fn test_cache_eviction_turns_oldest_into_misses() {
        let mock = MockAsyncHttpClient::with_response(200, JAKARTA_BODY);
        let provider = provider(mock.clone()).with_cache_size(20);

        for i in 0..21 {
            provider.resolve(&format!("address {}", i), "t").await;
        }
        assert_eq!(mock.request_count(), 21);

        // 20 / 10 = 2 oldest entries were evicted
        provider.resolve("address 0", "t").await;
        provider.resolve("address 1", "t").await;
        assert_eq!(mock.request_count(), 23);

        let recent = provider.resolve("address 20", "t").await;
        assert!(recent.cached);
        assert_eq!(mock.request_count(), 23);
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let mock = MockAsyncHttpClient::with_response(200, JAKARTA_BODY);
        let provider = provider(mock.clone());

        provider.resolve("Jakarta", "t").await;
        provider.clear_cache();
        provider.resolve("Jakarta", "t").await;

        assert_eq!(mock.request_count(), 2);
        assert_eq!(provider.cache_stats().size, 1);
    }
}

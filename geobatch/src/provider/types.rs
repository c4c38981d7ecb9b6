//! Core provider types: identities, outcomes and the adapter contract.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Error text for rate-limited responses.
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded";

/// Error text for an empty result set.
pub const NO_RESULTS_MESSAGE: &str = "No results found";

/// Errors raised inside the HTTP abstraction.
///
/// Adapters never let these escape; they are folded into a
/// [`GeocodeOutcome`] with the error text populated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),

    /// Request failed before a response was received (DNS, connect, timeout).
    #[error("Request failed: {0}")]
    Transport(String),

    /// Response body could not be read or decoded.
    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    /// Request URL could not be built.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Closed set of supported geocoding vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Mapbox Geocoding API (permanent endpoint).
    Mapbox,
    /// LocationIQ search API.
    LocationIq,
}

impl ProviderId {
    /// All providers in selection priority order.
    pub const ALL: [ProviderId; 2] = [ProviderId::LocationIq, ProviderId::Mapbox];

    /// Identifier used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Mapbox => "mapbox",
            ProviderId::LocationIq => "locationiq",
        }
    }

    /// Human readable vendor name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::Mapbox => "Mapbox",
            ProviderId::LocationIq => "LocationIQ",
        }
    }

    /// Environment variable holding the vendor credential.
    pub fn credential_env_var(&self) -> &'static str {
        match self {
            ProviderId::Mapbox => "MAPBOX_ACCESS_TOKEN",
            ProviderId::LocationIq => "LOCATIONIQ_ACCESS_TOKEN",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a provider identifier is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mapbox" => Ok(ProviderId::Mapbox),
            "locationiq" => Ok(ProviderId::LocationIq),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// Result of one geocoding attempt.
///
/// Built only through the named constructors so that the field combinations
/// stay consistent: coordinates are present exactly when `error` is absent,
/// and `retryable` is only ever set for rate-limit responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeOutcome {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub formatted_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub retryable: bool,
    pub cached: bool,
}

impl GeocodeOutcome {
    /// A resolved address.
    pub fn found(latitude: f64, longitude: f64, formatted_address: impl Into<String>) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            formatted_address: Some(formatted_address.into()),
            error: None,
            retryable: false,
            cached: false,
        }
    }

    /// The provider had no candidate for the address.
    pub fn no_results() -> Self {
        Self::failure(NO_RESULTS_MESSAGE)
    }

    /// The provider throttled the request; eligible for backoff retry.
    pub fn rate_limited() -> Self {
        Self {
            retryable: true,
            ..Self::failure(RATE_LIMIT_MESSAGE)
        }
    }

    /// A terminal, non-retryable failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            latitude: None,
            longitude: None,
            formatted_address: None,
            error: Some(message.into()),
            retryable: false,
            cached: false,
        }
    }

    /// Copy of this outcome tagged as served from cache.
    pub fn into_cached(self) -> Self {
        Self {
            cached: true,
            ..self
        }
    }

    /// Returns true if the outcome carries coordinates.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Classifies a non-success HTTP status into a terminal or retryable outcome.
///
/// Returns `None` for 2xx statuses, whose body the adapter still has to
/// interpret.
pub fn status_outcome(provider_name: &str, status: u16) -> Option<GeocodeOutcome> {
    match status {
        200..=299 => None,
        429 => Some(GeocodeOutcome::rate_limited()),
        _ => Some(GeocodeOutcome::failure(format!(
            "{} API error: {}",
            provider_name, status
        ))),
    }
}

/// A geocoding vendor adapter.
///
/// Implementations translate an address into a normalized outcome. They must
/// never return transport failures to the caller; every failure mode maps to
/// an outcome with `error` populated.
pub trait GeocodeProvider: Send + Sync {
    /// Resolves one address using the given credential.
    async fn resolve(&self, address: &str, credential: &str) -> GeocodeOutcome;

    /// Returns the provider identity.
    fn id(&self) -> ProviderId;

    /// Returns the vendor name, used in error messages.
    fn name(&self) -> &str {
        self.id().display_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_parse() {
        assert_eq!("mapbox".parse::<ProviderId>(), Ok(ProviderId::Mapbox));
        assert_eq!("LocationIQ".parse::<ProviderId>(), Ok(ProviderId::LocationIq));
        assert_eq!(" locationiq ".parse::<ProviderId>(), Ok(ProviderId::LocationIq));
    }

    #[test]
    fn test_provider_id_parse_unknown() {
        let err = "google".parse::<ProviderId>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown provider: google");
    }

    #[test]
    fn test_provider_id_display_round_trip() {
        for id in ProviderId::ALL {
            assert_eq!(id.to_string().parse::<ProviderId>(), Ok(id));
        }
    }

    #[test]
    fn test_outcome_found() {
        let outcome = GeocodeOutcome::found(-6.2, 106.8, "Jakarta");
        assert!(outcome.is_success());
        assert_eq!(outcome.latitude, Some(-6.2));
        assert_eq!(outcome.longitude, Some(106.8));
        assert!(!outcome.retryable);
        assert!(!outcome.cached);
    }

    #[test]
    fn test_outcome_rate_limited_is_retryable() {
        let outcome = GeocodeOutcome::rate_limited();
        assert!(outcome.retryable);
        assert_eq!(outcome.error.as_deref(), Some(RATE_LIMIT_MESSAGE));
        assert_eq!(outcome.latitude, None);
    }

    #[test]
    fn test_outcome_no_results_not_retryable() {
        let outcome = GeocodeOutcome::no_results();
        assert!(!outcome.retryable);
        assert_eq!(outcome.error.as_deref(), Some("No results found"));
    }

    #[test]
    fn test_outcome_into_cached() {
        let outcome = GeocodeOutcome::found(1.0, 2.0, "x").into_cached();
        assert!(outcome.cached);
        assert_eq!(outcome.latitude, Some(1.0));
    }

    #[test]
    fn test_status_outcome() {
        assert_eq!(status_outcome("Mapbox", 200), None);
        assert_eq!(status_outcome("Mapbox", 429), Some(GeocodeOutcome::rate_limited()));

        let outcome = status_outcome("LocationIQ", 500).unwrap();
        assert_eq!(outcome.error.as_deref(), Some("LocationIQ API error: 500"));
        assert!(!outcome.retryable);

        let outcome = status_outcome("Mapbox", 401).unwrap();
        assert_eq!(outcome.error.as_deref(), Some("Mapbox API error: 401"));
    }

    #[test]
    fn test_outcome_serializes_without_error_field_on_success() {
        let json = serde_json::to_value(GeocodeOutcome::found(1.0, 2.0, "x")).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["latitude"], 1.0);
    }
}

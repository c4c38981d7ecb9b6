//! Provider selection and credential lookup.
//!
//! The [`GeocodeDispatcher`] is the single entry point the batch pipeline
//! talks to. It owns one adapter per provider, looks up the credential for
//! the requested provider and delegates the lookup. A provider without a
//! credential is answered locally, without touching the network.
//!
//! The pipeline depends on the [`Geocode`] trait rather than on the
//! dispatcher itself, so tests can substitute scripted geocoders.

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::CacheStats;
use crate::config::ProviderCredentials;
use crate::provider::{
    AsyncHttpClient, GeocodeOutcome, GeocodeProvider, LocationIqProvider, MapboxProvider,
    ProviderError, ProviderId,
};

/// Failure of a geocoding call as a whole.
///
/// Adapters fold every expected failure into an outcome, so this only
/// surfaces when the call itself could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Unavailable(String),
}

/// The geocoding boundary used by the batch pipeline.
pub trait Geocode: Send + Sync {
    /// Resolves one address with the given provider.
    async fn geocode(
        &self,
        address: &str,
        provider: ProviderId,
    ) -> Result<GeocodeOutcome, GeocodeError>;
}

/// Routes lookups to the configured provider adapter.
///
/// # Example
///
/// ```ignore
/// use geobatch::config::ProviderCredentials;
/// use geobatch::dispatch::GeocodeDispatcher;
/// use geobatch::provider::{AsyncReqwestClient, ProviderId};
///
/// let dispatcher = GeocodeDispatcher::new(AsyncReqwestClient::new()?, ProviderCredentials::from_env());
/// let outcome = dispatcher.resolve("Jl. Sudirman 1, Jakarta", ProviderId::LocationIq).await;
/// ```
pub struct GeocodeDispatcher<C: AsyncHttpClient> {
    credentials: ProviderCredentials,
    mapbox: MapboxProvider<C>,
    locationiq: LocationIqProvider<C>,
}

impl<C: AsyncHttpClient + Clone> GeocodeDispatcher<C> {
    /// Creates a dispatcher with default adapters sharing one HTTP client.
    pub fn new(http_client: C, credentials: ProviderCredentials) -> Self {
        Self {
            credentials,
            mapbox: MapboxProvider::new(http_client.clone()),
            locationiq: LocationIqProvider::new(http_client),
        }
    }
}

impl<C: AsyncHttpClient> GeocodeDispatcher<C> {
    /// Creates a dispatcher from preconfigured adapters.
    pub fn with_providers(
        credentials: ProviderCredentials,
        mapbox: MapboxProvider<C>,
        locationiq: LocationIqProvider<C>,
    ) -> Self {
        Self {
            credentials,
            mapbox,
            locationiq,
        }
    }

    /// Resolves an address with the given provider.
    ///
    /// Never fails: a missing credential yields
    /// `"{Provider} access token not configured"`.
    pub async fn resolve(&self, address: &str, provider: ProviderId) -> GeocodeOutcome {
        let Some(token) = self.credentials.get(provider) else {
            warn!(provider = %provider, "Provider credential missing");
            return GeocodeOutcome::failure(format!(
                "{} access token not configured",
                provider.display_name()
            ));
        };

        debug!(provider = %provider, "Dispatching geocode request");
        match provider {
            ProviderId::Mapbox => self.mapbox.resolve(address, token).await,
            ProviderId::LocationIq => self.locationiq.resolve(address, token).await,
        }
    }

    /// Resolves an address with a provider given by name.
    ///
    /// Unknown names yield `"Unknown provider: {name}"`.
    pub async fn resolve_named(&self, address: &str, provider: &str) -> GeocodeOutcome {
        match provider.parse::<ProviderId>() {
            Ok(id) => self.resolve(address, id).await,
            Err(e) => GeocodeOutcome::failure(e.to_string()),
        }
    }

    /// Providers with a credential, in priority order.
    pub fn available_providers(&self) -> Vec<ProviderId> {
        self.credentials.available()
    }

    /// Statistics of the Mapbox result cache.
    pub fn mapbox_cache_stats(&self) -> CacheStats {
        self.mapbox.cache_stats()
    }
}

impl<C: AsyncHttpClient> Geocode for GeocodeDispatcher<C> {
    async fn geocode(
        &self,
        address: &str,
        provider: ProviderId,
    ) -> Result<GeocodeOutcome, GeocodeError> {
        Ok(self.resolve(address, provider).await)
    }
}

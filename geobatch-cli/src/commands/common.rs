//! Common types and utilities shared across CLI commands.

use clap::ValueEnum;
use geobatch::config::{ConfigFile, ProviderCredentials};
use geobatch::dispatch::GeocodeDispatcher;
use geobatch::provider::{AsyncReqwestClient, LocationIqProvider, MapboxProvider, ProviderId};

use crate::error::CliError;

/// Geocoding provider selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ProviderArg {
    /// LocationIQ search API (LOCATIONIQ_ACCESS_TOKEN)
    Locationiq,
    /// Mapbox geocoding API (MAPBOX_ACCESS_TOKEN)
    Mapbox,
}

impl From<ProviderArg> for ProviderId {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Locationiq => ProviderId::LocationIq,
            ProviderArg::Mapbox => ProviderId::Mapbox,
        }
    }
}

/// Picks the provider: CLI flag, then `providers.default`, then the first
/// configured provider.
///
/// The chosen provider must have a credential.
pub fn resolve_provider(
    cli_provider: Option<ProviderArg>,
    config: &ConfigFile,
    credentials: &ProviderCredentials,
) -> Result<ProviderId, CliError> {
    let provider = cli_provider
        .map(ProviderId::from)
        .or(config.providers.default)
        .or_else(|| credentials.available().first().copied())
        .ok_or_else(|| {
            CliError::Config(
                "No geocoding provider configured. Set LOCATIONIQ_ACCESS_TOKEN or \
                 MAPBOX_ACCESS_TOKEN, or run 'geobatch init'"
                    .to_string(),
            )
        })?;

    if !credentials.is_configured(provider) {
        return Err(CliError::Config(format!(
            "{} access token not configured. Set {} or providers.{}_access_token in config.ini",
            provider.display_name(),
            provider.credential_env_var(),
            provider.as_str()
        )));
    }

    Ok(provider)
}

/// Builds the dispatcher with the HTTP and cache settings from the config.
pub fn build_dispatcher(
    config: &ConfigFile,
    credentials: ProviderCredentials,
) -> Result<GeocodeDispatcher<AsyncReqwestClient>, CliError> {
    let http = AsyncReqwestClient::with_timeout(config.http.timeout_secs)?;
    let mapbox = MapboxProvider::new(http.clone()).with_cache_size(config.cache.max_entries);
    let locationiq = LocationIqProvider::new(http);
    Ok(GeocodeDispatcher::with_providers(
        credentials,
        mapbox,
        locationiq,
    ))
}

/// Masks a secret for display, keeping a short prefix.
pub fn mask_secret(value: &str) -> String {
    let prefix: String = value.chars().take(4).collect();
    if value.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", prefix)
    }
}

//! Provider credentials.

use std::collections::HashMap;

use super::ConfigFile;
use crate::provider::ProviderId;

/// Access tokens per provider.
///
/// Empty or whitespace-only tokens are treated as absent, so a provider is
/// "configured" only when it has a usable credential.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    tokens: HashMap<ProviderId, String>,
}

impl ProviderCredentials {
    /// Creates an empty credential set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads credentials from the process environment only.
    pub fn from_env() -> Self {
        Self::from_lookup(&ConfigFile::default(), |var| std::env::var(var).ok())
    }

    /// Resolves credentials from the environment, falling back to the config
    /// file's `[providers]` section.
    pub fn resolve(config: &ConfigFile) -> Self {
        Self::from_lookup(config, |var| std::env::var(var).ok())
    }

    /// Resolves credentials with a custom variable lookup.
    ///
    /// A variable returned by `lookup` wins over the config file value.
    pub fn from_lookup<F>(config: &ConfigFile, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut credentials = Self::new();
        for id in ProviderId::ALL {
            let from_file = match id {
                ProviderId::Mapbox => config.providers.mapbox_access_token.clone(),
                ProviderId::LocationIq => config.providers.locationiq_access_token.clone(),
            };
            let token = lookup(id.credential_env_var())
                .filter(|t| !t.trim().is_empty())
                .or(from_file);
            if let Some(token) = token {
                credentials = credentials.with(id, token);
            }
        }
        credentials
    }

    /// Sets the token for a provider. Empty tokens remove the entry.
    pub fn with(mut self, provider: ProviderId, token: impl Into<String>) -> Self {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            self.tokens.remove(&provider);
        } else {
            self.tokens.insert(provider, token);
        }
        self
    }

    /// Returns the token for a provider, if configured.
    pub fn get(&self, provider: ProviderId) -> Option<&str> {
        self.tokens.get(&provider).map(String::as_str)
    }

    /// Returns true if the provider has a credential.
    pub fn is_configured(&self, provider: ProviderId) -> bool {
        self.tokens.contains_key(&provider)
    }

    /// Configured providers in priority order (LocationIQ first).
    pub fn available(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.is_configured(*id))
            .collect()
    }
}

// Tokens never show up in debug output.
impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("configured", &self.available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_empty_token_is_absent() {
        let credentials = ProviderCredentials::new()
            .with(ProviderId::Mapbox, "")
            .with(ProviderId::LocationIq, "   ");
        assert!(credentials.available().is_empty());
        assert_eq!(credentials.get(ProviderId::Mapbox), None);
    }

    #[test]
    fn test_available_in_priority_order() {
        let credentials = ProviderCredentials::new()
            .with(ProviderId::Mapbox, "m")
            .with(ProviderId::LocationIq, "l");
        assert_eq!(
            credentials.available(),
            vec![ProviderId::LocationIq, ProviderId::Mapbox]
        );
    }

    #[test]
    fn test_from_config_file() {
        let mut config = ConfigFile::default();
        config.providers.mapbox_access_token = Some("pk.file".to_string());

        let credentials = ProviderCredentials::from_lookup(&config, no_env);
        assert_eq!(credentials.get(ProviderId::Mapbox), Some("pk.file"));
        assert!(!credentials.is_configured(ProviderId::LocationIq));
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut config = ConfigFile::default();
        config.providers.mapbox_access_token = Some("pk.file".to_string());
        config.providers.locationiq_access_token = Some("liq.file".to_string());

        let credentials = ProviderCredentials::from_lookup(&config, |var| match var {
            "MAPBOX_ACCESS_TOKEN" => Some("pk.env".to_string()),
            "LOCATIONIQ_ACCESS_TOKEN" => Some(String::new()),
            _ => None,
        });

        assert_eq!(credentials.get(ProviderId::Mapbox), Some("pk.env"));
        // Empty env var falls back to the file
        assert_eq!(credentials.get(ProviderId::LocationIq), Some("liq.file"));
    }

    #[test]
    fn test_debug_hides_tokens() {
        let credentials = ProviderCredentials::new().with(ProviderId::Mapbox, "pk.secret");
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("pk.secret"));
        assert!(debug.contains("Mapbox"));
    }
}

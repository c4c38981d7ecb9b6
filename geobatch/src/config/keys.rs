//! Addressable configuration keys for `config get/set/list`.

use std::fmt;
use std::str::FromStr;

use super::file::{parse_optional, parse_value};
use super::{ConfigError, ConfigFile};

/// A single setting, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ProvidersDefault,
    ProvidersLocationIqAccessToken,
    ProvidersMapboxAccessToken,
    PacingLocationIqDelayMs,
    PacingMapboxDelayMs,
    PacingDefaultDelayMs,
    PacingRetryBaseMs,
    PacingMaxRetries,
    PacingPaceSkippedRows,
    HttpTimeoutSecs,
    CacheMaxEntries,
}

const ALL_KEYS: [ConfigKey; 11] = [
    ConfigKey::ProvidersDefault,
    ConfigKey::ProvidersLocationIqAccessToken,
    ConfigKey::ProvidersMapboxAccessToken,
    ConfigKey::PacingLocationIqDelayMs,
    ConfigKey::PacingMapboxDelayMs,
    ConfigKey::PacingDefaultDelayMs,
    ConfigKey::PacingRetryBaseMs,
    ConfigKey::PacingMaxRetries,
    ConfigKey::PacingPaceSkippedRows,
    ConfigKey::HttpTimeoutSecs,
    ConfigKey::CacheMaxEntries,
];

impl ConfigKey {
    /// All keys, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// Full `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProvidersDefault => "providers.default",
            Self::ProvidersLocationIqAccessToken => "providers.locationiq_access_token",
            Self::ProvidersMapboxAccessToken => "providers.mapbox_access_token",
            Self::PacingLocationIqDelayMs => "pacing.locationiq_delay_ms",
            Self::PacingMapboxDelayMs => "pacing.mapbox_delay_ms",
            Self::PacingDefaultDelayMs => "pacing.default_delay_ms",
            Self::PacingRetryBaseMs => "pacing.retry_base_ms",
            Self::PacingMaxRetries => "pacing.max_retries",
            Self::PacingPaceSkippedRows => "pacing.pace_skipped_rows",
            Self::HttpTimeoutSecs => "http.timeout_secs",
            Self::CacheMaxEntries => "cache.max_entries",
        }
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        self.split().0
    }

    /// Key name within the section.
    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        let name = self.name();
        name.split_once('.').unwrap_or(("", name))
    }

    /// Returns true for credentials, which should be masked when listed.
    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            Self::ProvidersLocationIqAccessToken | Self::ProvidersMapboxAccessToken
        )
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            Self::ProvidersDefault => config
                .providers
                .default
                .map(|p| p.to_string())
                .unwrap_or_default(),
            Self::ProvidersLocationIqAccessToken => config
                .providers
                .locationiq_access_token
                .clone()
                .unwrap_or_default(),
            Self::ProvidersMapboxAccessToken => config
                .providers
                .mapbox_access_token
                .clone()
                .unwrap_or_default(),
            Self::PacingLocationIqDelayMs => config.pacing.locationiq_delay_ms.to_string(),
            Self::PacingMapboxDelayMs => config.pacing.mapbox_delay_ms.to_string(),
            Self::PacingDefaultDelayMs => config.pacing.default_delay_ms.to_string(),
            Self::PacingRetryBaseMs => config.pacing.retry_base_ms.to_string(),
            Self::PacingMaxRetries => config.pacing.max_retries.to_string(),
            Self::PacingPaceSkippedRows => config.pacing.pace_skipped_rows.to_string(),
            Self::HttpTimeoutSecs => config.http.timeout_secs.to_string(),
            Self::CacheMaxEntries => config.cache.max_entries.to_string(),
        }
    }

    /// Validates and stores a value. Empty strings clear optional settings.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let key = self.name();
        match self {
            Self::ProvidersDefault => config.providers.default = parse_optional(key, value)?,
            Self::ProvidersLocationIqAccessToken => {
                config.providers.locationiq_access_token = optional_text(value)
            }
            Self::ProvidersMapboxAccessToken => {
                config.providers.mapbox_access_token = optional_text(value)
            }
            Self::PacingLocationIqDelayMs => {
                config.pacing.locationiq_delay_ms = parse_value(key, value)?
            }
            Self::PacingMapboxDelayMs => config.pacing.mapbox_delay_ms = parse_value(key, value)?,
            Self::PacingDefaultDelayMs => config.pacing.default_delay_ms = parse_value(key, value)?,
            Self::PacingRetryBaseMs => config.pacing.retry_base_ms = parse_value(key, value)?,
            Self::PacingMaxRetries => config.pacing.max_retries = parse_value(key, value)?,
            Self::PacingPaceSkippedRows => {
                config.pacing.pace_skipped_rows = parse_value(key, value)?
            }
            Self::HttpTimeoutSecs => {
                let secs: u64 = parse_value(key, value)?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                        reason: "timeout must be at least 1 second".to_string(),
                    });
                }
                config.http.timeout_secs = secs;
            }
            Self::CacheMaxEntries => config.cache.max_entries = parse_value(key, value)?,
        }
        Ok(())
    }
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    #[test]
    fn test_parse_all_names() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
        assert_eq!(
            "HTTP.Timeout_Secs".parse::<ConfigKey>().unwrap(),
            ConfigKey::HttpTimeoutSecs
        );
    }

    #[test]
    fn test_parse_unknown() {
        let err = "packages.library_url".parse::<ConfigKey>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn test_section_and_key_name() {
        let key = ConfigKey::PacingMaxRetries;
        assert_eq!(key.section(), "pacing");
        assert_eq!(key.key_name(), "max_retries");
    }

    #[test]
    fn test_set_and_get() {
        let mut config = ConfigFile::default();

        ConfigKey::ProvidersDefault.set(&mut config, "Mapbox").unwrap();
        assert_eq!(config.providers.default, Some(ProviderId::Mapbox));
        assert_eq!(ConfigKey::ProvidersDefault.get(&config), "mapbox");

        ConfigKey::PacingMaxRetries.set(&mut config, "7").unwrap();
        assert_eq!(ConfigKey::PacingMaxRetries.get(&config), "7");

        ConfigKey::PacingPaceSkippedRows.set(&mut config, "false").unwrap();
        assert!(!config.pacing.pace_skipped_rows);
    }

    #[test]
    fn test_set_empty_clears_optional() {
        let mut config = ConfigFile::default();
        ConfigKey::ProvidersMapboxAccessToken
            .set(&mut config, "pk.abc")
            .unwrap();
        assert_eq!(ConfigKey::ProvidersMapboxAccessToken.get(&config), "pk.abc");

        ConfigKey::ProvidersMapboxAccessToken.set(&mut config, "  ").unwrap();
        assert_eq!(config.providers.mapbox_access_token, None);
        assert_eq!(ConfigKey::ProvidersMapboxAccessToken.get(&config), "");
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::PacingMaxRetries.set(&mut config, "-1").is_err());
        assert!(ConfigKey::HttpTimeoutSecs.set(&mut config, "0").is_err());
        assert!(ConfigKey::ProvidersDefault.set(&mut config, "here").is_err());
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_secret_keys() {
        let secrets: Vec<_> = ConfigKey::all().iter().filter(|k| k.is_secret()).collect();
        assert_eq!(secrets.len(), 2);
    }
}

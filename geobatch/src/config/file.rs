//! INI configuration file.
//!
//! Located at `~/.config/geobatch/config.ini` on Linux (platform config
//! directory elsewhere). Every setting is optional; a missing file yields
//! [`ConfigFile::default`].
//!
//! ```ini
//! [providers]
//! default = locationiq
//! locationiq_access_token = pk.xxx
//! mapbox_access_token = pk.yyy
//!
//! [pacing]
//! locationiq_delay_ms = 550
//! mapbox_delay_ms = 100
//! default_delay_ms = 500
//! retry_base_ms = 1000
//! max_retries = 3
//! pace_skipped_rows = true
//!
//! [http]
//! timeout_secs = 30
//!
//! [cache]
//! max_entries = 10000
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use super::ConfigError;
use crate::cache::CACHE_MAX_SIZE;
use crate::policy::{
    RatePolicy, DEFAULT_LOCATIONIQ_DELAY_MS, DEFAULT_MAPBOX_DELAY_MS, DEFAULT_MAX_RETRIES,
    DEFAULT_REQUEST_DELAY_MS, DEFAULT_RETRY_BASE_MS,
};
use crate::provider::{ProviderId, DEFAULT_TIMEOUT_SECS};

/// Directory name under the platform config directory.
const APP_DIR_NAME: &str = "geobatch";

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.ini";

/// Returns the path of the user's config file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// `[providers]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvidersSettings {
    /// Provider used when none is given on the command line.
    pub default: Option<ProviderId>,
    pub mapbox_access_token: Option<String>,
    pub locationiq_access_token: Option<String>,
}

/// `[pacing]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingSettings {
    pub mapbox_delay_ms: u64,
    pub locationiq_delay_ms: u64,
    pub default_delay_ms: u64,
    pub retry_base_ms: u64,
    pub max_retries: u32,
    pub pace_skipped_rows: bool,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            mapbox_delay_ms: DEFAULT_MAPBOX_DELAY_MS,
            locationiq_delay_ms: DEFAULT_LOCATIONIQ_DELAY_MS,
            default_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            retry_base_ms: DEFAULT_RETRY_BASE_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            pace_skipped_rows: true,
        }
    }
}

/// `[http]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_entries: CACHE_MAX_SIZE,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub providers: ProvidersSettings,
    pub pacing: PacingSettings,
    pub http: HttpSettings,
    pub cache: CacheSettings,
}

impl ConfigFile {
    /// Loads the user's config file, or defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads a config file from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_ini(&ini)
    }

    /// Writes the config to the user's config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Writes the config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        self.to_ini()
            .write_to_file(path)
            .map_err(|e| ConfigError::Write {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("providers")) {
            if let Some(v) = section.get("default") {
                config.providers.default = parse_optional("providers.default", v)?;
            }
            config.providers.mapbox_access_token =
                section.get("mapbox_access_token").and_then(non_empty);
            config.providers.locationiq_access_token =
                section.get("locationiq_access_token").and_then(non_empty);
        }

        if let Some(section) = ini.section(Some("pacing")) {
            let p = &mut config.pacing;
            read_value(section.get("mapbox_delay_ms"), "pacing.mapbox_delay_ms", &mut p.mapbox_delay_ms)?;
            read_value(
                section.get("locationiq_delay_ms"),
                "pacing.locationiq_delay_ms",
                &mut p.locationiq_delay_ms,
            )?;
            read_value(section.get("default_delay_ms"), "pacing.default_delay_ms", &mut p.default_delay_ms)?;
            read_value(section.get("retry_base_ms"), "pacing.retry_base_ms", &mut p.retry_base_ms)?;
            read_value(section.get("max_retries"), "pacing.max_retries", &mut p.max_retries)?;
            read_value(
                section.get("pace_skipped_rows"),
                "pacing.pace_skipped_rows",
                &mut p.pace_skipped_rows,
            )?;
        }

        if let Some(section) = ini.section(Some("http")) {
            read_value(section.get("timeout_secs"), "http.timeout_secs", &mut config.http.timeout_secs)?;
        }

        if let Some(section) = ini.section(Some("cache")) {
            read_value(section.get("max_entries"), "cache.max_entries", &mut config.cache.max_entries)?;
        }

        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("providers"))
            .set(
                "default",
                self.providers.default.map(|p| p.as_str()).unwrap_or(""),
            )
            .set(
                "locationiq_access_token",
                self.providers.locationiq_access_token.as_deref().unwrap_or(""),
            )
            .set(
                "mapbox_access_token",
                self.providers.mapbox_access_token.as_deref().unwrap_or(""),
            );

        ini.with_section(Some("pacing"))
            .set("locationiq_delay_ms", self.pacing.locationiq_delay_ms.to_string())
            .set("mapbox_delay_ms", self.pacing.mapbox_delay_ms.to_string())
            .set("default_delay_ms", self.pacing.default_delay_ms.to_string())
            .set("retry_base_ms", self.pacing.retry_base_ms.to_string())
            .set("max_retries", self.pacing.max_retries.to_string())
            .set("pace_skipped_rows", self.pacing.pace_skipped_rows.to_string());

        ini.with_section(Some("http"))
            .set("timeout_secs", self.http.timeout_secs.to_string());

        ini.with_section(Some("cache"))
            .set("max_entries", self.cache.max_entries.to_string());

        ini
    }

    /// Builds the pacing and retry policy from the `[pacing]` section.
    pub fn rate_policy(&self) -> RatePolicy {
        let p = &self.pacing;
        RatePolicy::default()
            .with_mapbox_delay(Duration::from_millis(p.mapbox_delay_ms))
            .with_locationiq_delay(Duration::from_millis(p.locationiq_delay_ms))
            .with_default_delay(Duration::from_millis(p.default_delay_ms))
            .with_retry_base(Duration::from_millis(p.retry_base_ms))
            .with_max_retries(p.max_retries)
            .with_pace_skipped_rows(p.pace_skipped_rows)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parses `raw` into `T`, mapping failures to [`ConfigError::InvalidValue`].
pub(crate) fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Like [`parse_value`] but an empty string means "unset".
pub(crate) fn parse_optional<T>(key: &str, raw: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_value(key, raw).map(Some)
    }
}

fn read_value<T>(raw: Option<&str>, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = raw.filter(|v| !v.trim().is_empty()) {
        *target = parse_value(key, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("nope.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.providers.default = Some(ProviderId::Mapbox);
        config.providers.mapbox_access_token = Some("pk.mapbox".to_string());
        config.pacing.locationiq_delay_ms = 1100;
        config.pacing.pace_skipped_rows = false;
        config.http.timeout_secs = 5;
        config.cache.max_entries = 50;

        config.save_to(&path).unwrap();
        let loaded = ConfigFile::load_from(&path).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.providers.locationiq_access_token, None);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[pacing]\nmax_retries = 5\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.pacing.max_retries, 5);
        assert_eq!(config.pacing.mapbox_delay_ms, DEFAULT_MAPBOX_DELAY_MS);
        assert_eq!(config.http.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[http]\ntimeout_secs = soon\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "http.timeout_secs"));
    }

    #[test]
    fn test_invalid_default_provider_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[providers]\ndefault = google\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Unknown provider: google"));
    }

    #[test]
    fn test_rate_policy_from_config() {
        let mut config = ConfigFile::default();
        config.pacing.mapbox_delay_ms = 250;
        config.pacing.retry_base_ms = 10;
        config.pacing.max_retries = 1;

        let policy = config.rate_policy();
        assert_eq!(
            policy.request_delay(ProviderId::Mapbox),
            Duration::from_millis(250)
        );
        assert_eq!(policy.retry_delay(1), Duration::from_millis(20));
        assert_eq!(policy.max_attempts(), 2);
        assert!(policy.pace_skipped_rows());
    }

    #[test]
    fn test_config_file_path_ends_with_app_dir() {
        let path = config_file_path();
        assert!(path.ends_with("geobatch/config.ini"));
    }
}

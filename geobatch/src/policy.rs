//! Pacing and retry policy for batch geocoding.
//!
//! Pure delay calculations, no I/O. The pipeline asks the policy how long to
//! wait between rows (provider rate limits) and how long to back off after a
//! throttled attempt.
//!
//! # Defaults
//!
//! | Setting            | Value                      |
//! |--------------------|----------------------------|
//! | LocationIQ pacing  | 550 ms (≈ 2 requests/sec)  |
//! | Mapbox pacing      | 100 ms (≈ 10 requests/sec) |
//! | Unknown provider   | 500 ms                     |
//! | Retry base delay   | 1000 ms                    |
//! | Max retries        | 3                          |
//!
//! Backoff delay for retry `n` (1-based) is `base * 2^n`, so the default
//! schedule is 2 s, 4 s, 8 s.

use std::time::Duration;

use crate::provider::ProviderId;

// =============================================================================
// Policy Constants
// =============================================================================

/// Delay between LocationIQ requests (free tier: 2 requests/sec).
pub const DEFAULT_LOCATIONIQ_DELAY_MS: u64 = 550;

/// Delay between Mapbox requests.
pub const DEFAULT_MAPBOX_DELAY_MS: u64 = 100;

/// Delay for providers without a dedicated setting.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;

/// Base delay for exponential backoff.
pub const DEFAULT_RETRY_BASE_MS: u64 = 1000;

/// Retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Largest exponent applied to the retry base; keeps the shift in range.
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Request pacing and retry settings.
///
/// # Example
///
/// ```ignore
/// use geobatch::policy::RatePolicy;
/// use geobatch::provider::ProviderId;
///
/// let policy = RatePolicy::default();
/// assert_eq!(policy.request_delay(ProviderId::LocationIq).as_millis(), 550);
/// assert_eq!(policy.retry_delay(2).as_millis(), 4000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatePolicy {
    mapbox_delay: Duration,
    locationiq_delay: Duration,
    default_delay: Duration,
    retry_base: Duration,
    max_retries: u32,
    pace_skipped_rows: bool,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            mapbox_delay: Duration::from_millis(DEFAULT_MAPBOX_DELAY_MS),
            locationiq_delay: Duration::from_millis(DEFAULT_LOCATIONIQ_DELAY_MS),
            default_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            retry_base: Duration::from_millis(DEFAULT_RETRY_BASE_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            pace_skipped_rows: true,
        }
    }
}

impl RatePolicy {
    /// Inter-request delay for a provider.
    pub fn request_delay(&self, provider: ProviderId) -> Duration {
        match provider {
            ProviderId::Mapbox => self.mapbox_delay,
            ProviderId::LocationIq => self.locationiq_delay,
        }
    }

    /// Inter-request delay by provider name; unrecognised names get the
    /// default delay.
    pub fn request_delay_for_name(&self, name: &str) -> Duration {
        name.parse::<ProviderId>()
            .map(|id| self.request_delay(id))
            .unwrap_or(self.default_delay)
    }

    /// Backoff before retry `attempt` (1-based): `base * 2^attempt`.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(MAX_BACKOFF_EXPONENT);
        self.retry_base.saturating_mul(factor)
    }

    /// Number of retries after the initial attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total attempts per row (`max_retries + 1`).
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Whether rows skipped without a network call still pay the delay.
    pub fn pace_skipped_rows(&self) -> bool {
        self.pace_skipped_rows
    }

    pub fn with_mapbox_delay(mut self, delay: Duration) -> Self {
        self.mapbox_delay = delay;
        self
    }

    pub fn with_locationiq_delay(mut self, delay: Duration) -> Self {
        self.locationiq_delay = delay;
        self
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn with_retry_base(mut self, base: Duration) -> Self {
        self.retry_base = base;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_pace_skipped_rows(mut self, pace: bool) -> Self {
        self.pace_skipped_rows = pace;
        self
    }
}

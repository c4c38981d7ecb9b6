//! Geocoding provider adapters.
//!
//! Each adapter turns an address into a [`GeocodeOutcome`], hiding the
//! vendor's request shape, response layout and status codes. Adapters are
//! generic over [`AsyncHttpClient`] so they can be tested without network
//! access.
//!
//! # Outcome Classification
//!
//! | Response                  | Outcome                                     |
//! |---------------------------|---------------------------------------------|
//! | 2xx with a candidate      | coordinates + formatted address             |
//! | 2xx without a candidate   | `No results found`                          |
//! | 429                       | `Rate limit exceeded`, `retryable = true`   |
//! | other status              | `{Provider} API error: {status}`            |
//! | transport / body failure  | error text, `retryable = false`             |

mod http;
mod locationiq;
mod mapbox;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpResponse, DEFAULT_TIMEOUT_SECS};
pub use locationiq::{LocationIqProvider, LOCATIONIQ_BASE_URL};
pub use mapbox::{MapboxProvider, MAPBOX_BASE_URL};
pub use types::{
    status_outcome, GeocodeOutcome, GeocodeProvider, ProviderError, ProviderId, UnknownProvider,
    NO_RESULTS_MESSAGE, RATE_LIMIT_MESSAGE,
};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;

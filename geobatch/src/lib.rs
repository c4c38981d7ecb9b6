//! geobatch - batch address geocoding
//!
//! This library turns a sheet of address rows into the same rows annotated
//! with latitude/longitude, resolved one row at a time through a rate-limited
//! external geocoding provider (Mapbox or LocationIQ).
//!
//! # Architecture
//!
//! ```text
//! sheet (rows) ──► BatchPipeline ──► GeocodeDispatcher ──► provider adapter ──► HTTP
//!                      │   ▲                                    │
//!                      │   └── RatePolicy (pacing, backoff)     └── GeocodeCache (Mapbox)
//!                      ▼
//!               ProcessingState ──► progress callback
//! ```

pub mod batch;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod policy;
pub mod provider;
pub mod sheet;

/// Crate version, as reported by the CLI banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Sequential batch geocoding.
//!
//! Rows are processed strictly one at a time, in input order:
//!
//! ```text
//! row ──► address? ──no──► status "No address"
//!            │yes
//!            ▼
//!        attempt ──Terminal──► apply outcome
//!            │
//!            ├──Throttled──► backoff retry_delay(n) ──► attempt (until max_retries)
//!            └──Crashed────► backoff retry_delay(n) ──► attempt, else status "Error"
//!            ▼
//!   publish progress ──► inter-request delay ──► next row
//! ```
//!
//! A failing row never aborts the batch; its error text lands in the row's
//! `status` cell and in [`ProcessingState::errors`].

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::{ProcessingState, ProgressCallback};
use crate::dispatch::{Geocode, GeocodeError};
use crate::policy::RatePolicy;
use crate::provider::{GeocodeOutcome, ProviderId};
use crate::sheet::{AddressRow, STATUS_ERROR, STATUS_NO_ADDRESS, STATUS_SUCCESS};

/// Input of one batch run.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub rows: Vec<AddressRow>,
    /// Column holding the address text.
    pub address_column: String,
    pub provider: ProviderId,
}

impl BatchJob {
    pub fn new(rows: Vec<AddressRow>, address_column: impl Into<String>, provider: ProviderId) -> Self {
        Self {
            rows,
            address_column: address_column.into(),
            provider,
        }
    }
}

/// Result of a batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Processed rows in input order. Shorter than the input when cancelled.
    pub rows: Vec<AddressRow>,
    /// Final processing state.
    pub state: ProcessingState,
    /// True if the run stopped before every row was processed.
    pub cancelled: bool,
}

/// Row counts by terminal status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub no_address: usize,
    pub failed: usize,
}

impl BatchReport {
    /// Per-row error messages.
    pub fn errors(&self) -> &[String] {
        &self.state.errors
    }

    /// Counts processed rows by status.
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.rows.len(),
            ..Default::default()
        };
        for row in &self.rows {
            match row.status() {
                Some(STATUS_SUCCESS) => summary.succeeded += 1,
                Some(STATUS_NO_ADDRESS) => summary.no_address += 1,
                _ => summary.failed += 1,
            }
        }
        summary
    }
}

/// Classified result of one geocoding attempt.
#[derive(Debug)]
enum Attempt {
    /// Success or non-retryable failure.
    Terminal(GeocodeOutcome),
    /// Rate limited; retry after backoff.
    Throttled(GeocodeOutcome),
    /// The geocoding call failed as a whole.
    Crashed(GeocodeError),
}

impl From<Result<GeocodeOutcome, GeocodeError>> for Attempt {
    fn from(result: Result<GeocodeOutcome, GeocodeError>) -> Self {
        match result {
            Ok(outcome) if outcome.retryable => Attempt::Throttled(outcome),
            Ok(outcome) => Attempt::Terminal(outcome),
            Err(e) => Attempt::Crashed(e),
        }
    }
}

/// Drives rows through a geocoder under a [`RatePolicy`].
///
/// # Example
///
/// ```ignore
/// let pipeline = BatchPipeline::new(dispatcher, RatePolicy::default());
/// let report = pipeline
///     .run(BatchJob::new(rows, "alamat", ProviderId::LocationIq))
///     .await;
/// ```
pub struct BatchPipeline<G: Geocode> {
    geocoder: G,
    policy: RatePolicy,
}

impl<G: Geocode> BatchPipeline<G> {
    pub fn new(geocoder: G, policy: RatePolicy) -> Self {
        Self { geocoder, policy }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub fn policy(&self) -> &RatePolicy {
        &self.policy
    }

    /// Processes every row without progress reporting or cancellation.
    pub async fn run(&self, job: BatchJob) -> BatchReport {
        self.run_with(job, None, CancellationToken::new()).await
    }

    /// Processes rows, publishing progress after each one.
    ///
    /// `cancellation` is honoured between rows and during the inter-request
    /// delay; an in-flight row always completes.
    pub async fn run_with(
        &self,
        job: BatchJob,
        progress: Option<ProgressCallback>,
        cancellation: CancellationToken,
    ) -> BatchReport {
        let BatchJob {
            rows,
            address_column,
            provider,
        } = job;

        let total = rows.len();
        let delay = self.policy.request_delay(provider);
        let mut state = ProcessingState::start(total);
        let mut processed = Vec::with_capacity(total);

        info!(rows = total, provider = %provider, column = %address_column, "Starting batch");
        publish(&progress, &state);

        for (index, mut row) in rows.into_iter().enumerate() {
            if cancellation.is_cancelled() {
                break;
            }

            let reached_geocoder = self
                .process_row(index, &mut row, &address_column, provider, &mut state)
                .await;
            processed.push(row);
            state.advance();
            publish(&progress, &state);

            if reached_geocoder || self.policy.pace_skipped_rows() {
                tokio::select! {
                    _ = cancellation.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        state.finish();
        publish(&progress, &state);

        let cancelled = processed.len() < total;
        if cancelled {
            warn!(processed = processed.len(), total, "Batch cancelled");
        } else {
            info!(rows = total, errors = state.errors.len(), "Batch complete");
        }

        BatchReport {
            rows: processed,
            state,
            cancelled,
        }
    }

    /// Processes one row. Returns true if the geocoder was called.
    async fn process_row(
        &self,
        index: usize,
        row: &mut AddressRow,
        address_column: &str,
        provider: ProviderId,
        state: &mut ProcessingState,
    ) -> bool {
        let Some(address) = row.address(address_column).map(str::to_string) else {
            debug!(row = index + 1, "No address");
            row.set_status(STATUS_NO_ADDRESS);
            return false;
        };

        let max_retries = self.policy.max_retries();
        let mut retries = 0;

        loop {
            let attempt = Attempt::from(self.geocoder.geocode(&address, provider).await);
            let exhausted = retries >= max_retries;

            match attempt {
                Attempt::Terminal(outcome) => {
                    apply_outcome(index, row, &outcome, state);
                    break;
                }
                Attempt::Throttled(outcome) if exhausted => {
                    warn!(row = index + 1, attempts = retries + 1, "Rate limited, giving up");
                    apply_outcome(index, row, &outcome, state);
                    break;
                }
                Attempt::Crashed(e) if exhausted => {
                    warn!(row = index + 1, error = %e, "Geocoding failed, giving up");
                    row.set_status(STATUS_ERROR);
                    state.record_error(index, &e.to_string());
                    break;
                }
                Attempt::Throttled(_) | Attempt::Crashed(_) => {
                    retries += 1;
                    let backoff = self.policy.retry_delay(retries);
                    debug!(
                        row = index + 1,
                        retry = retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "Retrying after backoff"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        true
    }
}

fn apply_outcome(
    index: usize,
    row: &mut AddressRow,
    outcome: &GeocodeOutcome,
    state: &mut ProcessingState,
) {
    row.apply_outcome(outcome);
    match &outcome.error {
        Some(error) => {
            debug!(row = index + 1, error = %error, "Row failed");
            state.record_error(index, error);
        }
        None => debug!(row = index + 1, cached = outcome.cached, "Row geocoded"),
    }
}

fn publish(progress: &Option<ProgressCallback>, state: &ProcessingState) {
    if let Some(callback) = progress {
        callback(state);
    }
}

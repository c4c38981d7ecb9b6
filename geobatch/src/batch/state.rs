//! Batch progress state.

use serde::Serialize;

/// Progress callback invoked with a snapshot after every row.
pub type ProgressCallback = Box<dyn Fn(&ProcessingState) + Send + Sync>;

/// Progress of one batch run.
///
/// Owned by the pipeline; observers only ever see snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingState {
    /// True while rows are being processed.
    pub is_processing: bool,
    /// Rows completed so far.
    pub current: usize,
    /// Rows in the batch.
    pub total: usize,
    /// Per-row error messages, `"Row {n}: {error}"`.
    pub errors: Vec<String>,
}

impl ProcessingState {
    /// State at the start of a batch of `total` rows.
    pub fn start(total: usize) -> Self {
        Self {
            is_processing: true,
            current: 0,
            total,
            errors: Vec::new(),
        }
    }

    /// Records a completed row.
    pub fn advance(&mut self) {
        self.current += 1;
    }

    /// Records an error for the row at 0-based `index`.
    pub fn record_error(&mut self, index: usize, error: &str) {
        self.errors.push(format!("Row {}: {}", index + 1, error));
    }

    /// Marks the batch as finished.
    pub fn finish(&mut self) {
        self.is_processing = false;
    }

    /// Completion in percent (100 for an empty batch).
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.current as f64 * 100.0 / self.total as f64
        }
    }
}

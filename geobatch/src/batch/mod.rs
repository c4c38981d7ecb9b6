//! Batch orchestration: runs address rows through a geocoder one by one,
//! with pacing, retry backoff, progress reporting and cancellation.

mod pipeline;
mod state;

pub use pipeline::{BatchJob, BatchPipeline, BatchReport, BatchSummary};
pub use state::{ProcessingState, ProgressCallback};

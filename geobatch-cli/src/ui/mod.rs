//! Terminal output helpers.

mod progress;

pub use progress::{format_errors, BatchProgress, MAX_DISPLAYED_ERRORS};

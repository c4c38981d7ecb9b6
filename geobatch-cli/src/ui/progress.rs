//! Terminal progress bar for batch runs.

use std::time::Duration;

use geobatch::batch::{ProcessingState, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Errors shown in the final summary before truncating.
pub const MAX_DISPLAYED_ERRORS: usize = 5;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({percent}%) {msg}";

/// Progress display driven by pipeline state snapshots.
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    /// Creates a bar for `total` rows; `visible = false` draws nothing.
    pub fn new(total: usize, visible: bool) -> Self {
        let bar = ProgressBar::new(total as u64);
        if visible {
            let style = ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-");
            bar.set_style(style);
            bar.enable_steady_tick(Duration::from_millis(120));
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self { bar }
    }

    /// Callback that mirrors each snapshot onto the bar.
    pub fn callback(&self) -> ProgressCallback {
        let bar = self.bar.clone();
        Box::new(move |state: &ProcessingState| {
            bar.set_position(state.current as u64);
            bar.set_message(status_message(state));
        })
    }

    /// Clears the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn status_message(state: &ProcessingState) -> String {
    match state.errors.len() {
        0 => String::new(),
        1 => "1 error".to_string(),
        n => format!("{} errors", n),
    }
}

/// Formats the error list, keeping the first `limit` entries.
pub fn format_errors(errors: &[String], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = errors.iter().take(limit).cloned().collect();
    if errors.len() > limit {
        lines.push(format!("...and {} more", errors.len() - limit));
    }
    lines
}

//! Shared command handlers

mod list;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use list::{log_cache_status, run_list_command, settle};

/// Spinner on stderr while a cache handle loads.
///
/// Hidden for JSON output so scripted callers only ever see the payload.
pub fn spinner(message: &str, format: crate::cli::OutputFormat) -> ProgressBar {
    if format == crate::cli::OutputFormat::Json {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

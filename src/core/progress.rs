//! Spinner shown while the organisation is being listed

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner} {wide_msg}";
const SPINNER_TICK_MS: u64 = 100;

/// Creates a spinner with the given message
///
/// indicatif hides the spinner automatically when stderr is not a terminal.
pub fn create_spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(create_spinner_style()?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    Ok(spinner)
}

/// Returns a ProgressStyle configured with the application's spinner template
pub(crate) fn create_spinner_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_spinner().template(SPINNER_TEMPLATE)?)
}

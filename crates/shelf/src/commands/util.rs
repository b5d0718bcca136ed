//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use shelf_core::ClassifiedError;

use crate::error::CliError;

/// A stderr spinner, hidden when quiet or not attached to a terminal.
pub fn spinner(quiet: bool) -> ProgressBar {
    if quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Whether stdin and stderr are both a terminal, so prompting makes sense.
pub fn interactive() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Show the failure and ask whether to try again.
pub fn confirm_retry(error: &ClassifiedError) -> Result<bool, CliError> {
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(format!("{} Try again?", error.message()))
        .default(true)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}

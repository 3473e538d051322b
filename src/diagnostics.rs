//! Colored warning/error output for best-effort conditions that spec.md
//! requires to degrade gracefully rather than abort the run.

use owo_colors::OwoColorize;

/// Prints a colored warning message and logs it at `warn` level.
pub fn print_warning(message: &str) {
    eprintln!("{} {message}", "WARNING:".yellow().bold());
    log::warn!("{message}");
}

/// Prints a colored error message and logs it at `error` level.
pub fn print_error(message: &str) {
    eprintln!("{} {message}", "error:".red().bold());
    log::error!("{message}");
}

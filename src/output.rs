//! Colored output and progress reporting
//!
//! Uses owo-colors for terminal colors and indicatif for progress bars.
//! Status goes to stdout, warnings and errors to stderr.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Standard spinner characters
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

const TICK_INTERVAL_MS: u64 = 80;

const BYTES_TEMPLATE: &str = "     {spinner:.cyan} [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta})";

/// Print an action header (blue, bold)
/// Example: "==> Generating recipe for octomap-ros 0.4.0"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a sub-action (cyan arrow)
/// Example: "  -> extract"
pub fn sub_action(step: &str) {
    println!("  {} {}", "->".cyan(), step);
}

/// Print a detail line (dimmed)
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print a success message (green)
pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Create a spinner with standard styling.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("     {spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars(SPINNER_CHARS),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(TICK_INTERVAL_MS));
    pb
}

/// Turn a spinner into a byte progress bar once the content length is known.
pub fn upgrade_to_bytes(pb: &ProgressBar, total_bytes: u64) {
    pb.set_length(total_bytes);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(BYTES_TEMPLATE)
            .unwrap()
            .progress_chars("━╸━"),
    );
}

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while an operation's commands run.
///
/// The spinner ticks on indicatif's own thread, so it keeps moving while the
/// caller blocks on the command. It stops when the caller finishes it, not
/// when the estimate runs out.
pub fn spinner(message: &str, estimate: Duration, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.bold.cyan} {msg} {elapsed:.dim}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
    );
    spinner.set_message(format!("{} {}", "Cleaning".cyan().bold(), message.bold()));
    spinner.enable_steady_tick(tick_interval(estimate));
    spinner
}

/// Turn off colour for both our own output and indicatif's templates.
pub fn disable_colors() {
    colored::control::set_override(false);
    console::set_colors_enabled(false);
    console::set_colors_enabled_stderr(false);
}

/// Roughly twenty frames over the estimated duration.
pub fn tick_interval(estimate: Duration) -> Duration {
    (estimate / 20).clamp(Duration::from_millis(80), Duration::from_millis(250))
}

pub fn finish_ok(spinner: &ProgressBar, message: &str) {
    spinner.finish_with_message(format!("{} {}", "✓".green().bold(), message.green()));
}

pub fn finish_err(spinner: &ProgressBar, message: &str) {
    spinner.finish_with_message(format!("{} {}", "✗".red().bold(), message.red()));
}

//! Simple spinner for waits without a known duration.

use indicatif::{ProgressBar, ProgressStyle};
use super::paint;
use owo_colors::Style;
use std::time::Duration;

/// Spinner shown while waiting on the bundler or the local service.
///
/// ```no_run
/// use kinvey_flex_scripts::ui::Spinner;
///
/// let spinner = Spinner::new("Waiting for dist/index.js...");
/// spinner.finish("Bundle ready");
/// ```
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Create and start a new spinner.
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_strings(&["◐", "◓", "◑", "◒"]));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Finish spinner with a green checkmark.
    pub fn finish(&self, message: &str) {
        self.pb
            .finish_with_message(format!("{} {}", paint("✓", Style::new().green()), message));
    }

    /// Finish spinner with a red X.
    pub fn fail(&self, message: &str) {
        self.pb
            .finish_with_message(format!("{} {}", paint("✗", Style::new().red()), message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_creation() {
        let spinner = Spinner::new("Waiting...");
        spinner.finish("Done");
    }

    #[test]
    fn test_spinner_fail() {
        let spinner = Spinner::new("Discovering");
        spinner.fail("Failed");
    }
}

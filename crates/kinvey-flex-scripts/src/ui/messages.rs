//! Status message functions for terminal output.

use super::paint;
use owo_colors::Style;

/// Print a success message to stderr.
///
/// ```no_run
/// use kinvey_flex_scripts::ui::success;
///
/// success("Deployment complete.");
/// ```
pub fn success(message: &str) {
    eprintln!("{} {}", paint("✓", Style::new().green().bold()), message);
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    eprintln!("{} {}", paint("ℹ", Style::new().blue().bold()), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        paint("⚠", Style::new().yellow().bold()),
        paint(message, Style::new().yellow())
    );
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!(
        "{} {}",
        paint("✗", Style::new().red().bold()),
        paint(message, Style::new().red())
    );
}

/// Print a highlighted command suggestion, indented under the previous line.
///
/// ```no_run
/// use kinvey_flex_scripts::ui::command;
///
/// command("kinvey flex status");
/// ```
pub fn command(text: &str) {
    eprintln!("  {}", paint(text, Style::new().cyan()));
}

/// Print a `label: value` line with the value colored by `ok`.
pub fn field(label: &str, value: &str, ok: bool) {
    let style = if ok {
        Style::new().green()
    } else {
        Style::new().yellow()
    };
    eprintln!("{}: {}", label, paint(value, style));
}

/// Print a plain line to stdout, used for machine-readable listings.
pub fn line(message: &str) {
    println!("{}", message);
}

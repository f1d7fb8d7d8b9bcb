//! Terminal UI helpers: status messages, spinners and console handling.
//!
//! ```no_run
//! use kinvey_flex_scripts::ui;
//!
//! ui::init_colors(false);
//! let spinner = ui::Spinner::new("Waiting for bundle...");
//! spinner.finish("Bundle ready");
//! ui::success("Development server running");
//! ```

mod messages;
mod spinner;

use owo_colors::{OwoColorize, Style};
use std::sync::atomic::{AtomicBool, Ordering};

pub use messages::{command, error, field, info, line, success, warning};
pub use spinner::Spinner;

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR, falls back to terminal detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

static COLOR: AtomicBool = AtomicBool::new(false);

/// Initialize color support from the environment and `--no-color`.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    set_color(enabled);
    tracing::debug!(color = enabled, "terminal color support");
}

/// Turns ANSI styling on or off for every `ui` line, spinners included.
pub fn set_color(enabled: bool) {
    COLOR.store(enabled, Ordering::Relaxed);
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}

pub fn color_enabled() -> bool {
    COLOR.load(Ordering::Relaxed)
}

/// `text` with `style` applied, or unchanged when colors are off.
pub(crate) fn paint(text: &str, style: Style) -> String {
    if color_enabled() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Whether stdout is an interactive terminal.
pub fn is_interactive() -> bool {
    console::Term::stdout().is_term()
}

/// Clears the terminal when attached to one.
pub fn clear_console() {
    if is_interactive() {
        let _ = console::Term::stdout().clear_screen();
    }
}

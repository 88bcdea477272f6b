//! Non-interactive UI for CI/headless environments.
//!
//! Everything is written to stderr as plain lines so that stdout only
//! carries rendered results.

use super::spinner::LineSpinner;
use super::{OutputMode, SpinnerHandle, UserInterface};

/// UI implementation for non-interactive mode.
pub struct NonInteractiveUI {
    mode: OutputMode,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(LineSpinner::new(message, self.mode.shows_checks()))
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_checks() {
            eprintln!("{}", title);
        }
    }

    fn show_details(&mut self, details: &str) {
        if self.mode.shows_details() {
            for line in details.lines() {
                eprintln!("    {}", line);
            }
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

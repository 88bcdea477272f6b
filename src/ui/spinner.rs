//! Progress spinners for checks that invoke the compiler.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::theme::ProbeTheme;
use super::SpinnerHandle;

/// A spinner shown while a check runs, replaced by the check line when done.
pub struct ProgressSpinner {
    bar: ProgressBar,
    label: String,
    theme: ProbeTheme,
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(label: &str, theme: ProbeTheme) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.magenta} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            label: label.to_string(),
            theme,
        }
    }

    /// Create a spinner that doesn't show (for quiet modes).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            label: String::new(),
            theme: ProbeTheme::plain(),
        }
    }

    fn finish(&mut self, line: String) {
        self.bar.set_style(
            ProgressStyle::default_spinner()
                .template("{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        self.bar.finish_with_message(line);
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(format!("{} {}", self.label, msg));
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_check(&self.label, msg, &self.theme.success);
        self.finish(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_check(&self.label, msg, &self.theme.error);
        self.finish(line);
    }

    fn finish_skipped(&mut self, msg: &str) {
        let line = self.theme.format_check(&self.label, msg, &self.theme.warning);
        self.finish(line);
    }
}

/// A spinner that prints one plain line when finished, for logs and CI.
pub struct LineSpinner {
    label: String,
    visible: bool,
}

impl LineSpinner {
    pub fn new(label: &str, visible: bool) -> Self {
        Self {
            label: label.to_string(),
            visible,
        }
    }

    fn print(&self, msg: &str) {
        if self.visible {
            eprintln!("{} ... {}", self.label, msg);
        }
    }
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        self.print(msg);
    }

    fn finish_error(&mut self, msg: &str) {
        self.print(msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.print(msg);
    }
}

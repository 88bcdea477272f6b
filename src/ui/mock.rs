//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use depprobe::ui::{MockUI, SpinnerHandle, SpinnerStatus, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Probing");
//! let mut spinner = ui.start_spinner("Checking for 'openssl'");
//! spinner.finish_success("yes (1.1.0)");
//!
//! assert!(ui.has_message("Probing"));
//! assert_eq!(ui.spinners()[0].status, Some(SpinnerStatus::Success));
//! assert_eq!(ui.check_lines(), vec!["Checking for 'openssl' ... yes (1.1.0)"]);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use super::{OutputMode, SpinnerHandle, UserInterface};

/// Status of a mock spinner when finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerStatus {
    /// Finished successfully.
    Success,
    /// Finished with error.
    Error,
    /// Finished as skipped.
    Skipped,
}

/// Everything recorded about one spinner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpinnerRecord {
    pub label: String,
    pub messages: Vec<String>,
    pub finish_message: Option<String>,
    pub status: Option<SpinnerStatus>,
}

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    details: Vec<String>,
    spinners: Rc<RefCell<Vec<SpinnerRecord>>>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set whether this mock behaves as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }

    /// Snapshot of every spinner started so far.
    pub fn spinners(&self) -> Vec<SpinnerRecord> {
        self.spinners.borrow().clone()
    }

    /// Finished spinners rendered as `label ... result` lines.
    pub fn check_lines(&self) -> Vec<String> {
        self.spinners
            .borrow()
            .iter()
            .filter_map(|s| {
                s.finish_message
                    .as_ref()
                    .map(|m| format!("{} ... {}", s.label, m))
            })
            .collect()
    }

    /// Check if a message containing `text` was shown.
    pub fn has_message(&self, text: &str) -> bool {
        self.messages.iter().any(|m| m.contains(text))
    }

    /// Check if a success message containing `text` was shown.
    pub fn has_success(&self, text: &str) -> bool {
        self.successes.iter().any(|m| m.contains(text))
    }

    /// Check if a warning containing `text` was shown.
    pub fn has_warning(&self, text: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(text))
    }

    /// Check if an error containing `text` was shown.
    pub fn has_error(&self, text: &str) -> bool {
        self.errors.iter().any(|m| m.contains(text))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        let mut spinners = self.spinners.borrow_mut();
        spinners.push(SpinnerRecord {
            label: message.to_string(),
            ..Default::default()
        });
        Box::new(MockSpinner {
            records: Rc::clone(&self.spinners),
            index: spinners.len() - 1,
        })
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_details(&mut self, details: &str) {
        self.details.push(details.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Spinner handed out by [`MockUI`]; writes back into the UI's records.
#[derive(Debug)]
pub struct MockSpinner {
    records: Rc<RefCell<Vec<SpinnerRecord>>>,
    index: usize,
}

impl MockSpinner {
    fn finish(&mut self, msg: &str, status: SpinnerStatus) {
        if let Some(record) = self.records.borrow_mut().get_mut(self.index) {
            record.finish_message = Some(msg.to_string());
            record.status = Some(status);
        }
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        if let Some(record) = self.records.borrow_mut().get_mut(self.index) {
            record.messages.push(msg.to_string());
        }
    }

    fn finish_success(&mut self, msg: &str) {
        self.finish(msg, SpinnerStatus::Success);
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish(msg, SpinnerStatus::Error);
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.finish(msg, SpinnerStatus::Skipped);
    }
}

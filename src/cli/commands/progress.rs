//! Turns [`ProbeEvent`]s into `Checking for ... yes` lines.

use crate::probe::{Capability, ProbeEvent, ProbeOutcome};
use crate::ui::{SpinnerHandle, UserInterface};

/// Drives one spinner per check.
pub struct ProgressReporter<'u> {
    ui: &'u mut dyn UserInterface,
    spinner: Option<Box<dyn SpinnerHandle>>,
    found: usize,
    absent: usize,
}

impl<'u> ProgressReporter<'u> {
    pub fn new(ui: &'u mut dyn UserInterface) -> Self {
        Self {
            ui,
            spinner: None,
            found: 0,
            absent: 0,
        }
    }

    /// Number of capabilities registered so far.
    pub fn found(&self) -> usize {
        self.found
    }

    /// Number of optional capabilities left out.
    pub fn absent(&self) -> usize {
        self.absent
    }

    pub fn handle(&mut self, event: ProbeEvent<'_>) {
        match event {
            ProbeEvent::Started { label } => {
                self.spinner = Some(self.ui.start_spinner(&format!("Checking for '{}'", label)));
            }
            ProbeEvent::CompilerReady { compiler, .. } => {
                self.finish(|s| s.finish_success(compiler));
            }
            ProbeEvent::Feature { supported, .. } => {
                if supported {
                    self.finish(|s| s.finish_success("yes"));
                } else {
                    self.finish(|s| s.finish_skipped("no"));
                }
            }
            ProbeEvent::Finished { label, outcome } => self.finished(label, outcome),
            ProbeEvent::Failed { error, .. } => {
                let reason = error.short_reason();
                self.finish(|s| s.finish_error(reason));
            }
        }
    }

    fn finished(&mut self, label: &str, outcome: &ProbeOutcome) {
        match outcome {
            ProbeOutcome::Registered(record) => {
                self.found += 1;
                let result = match &record.version {
                    Some(version) => format!("yes ({})", version),
                    None => "yes".to_string(),
                };
                self.finish(|s| s.finish_success(&result));

                let is_framework = label == Capability::OsxFrameworks.name();
                let mut flags = record.cflags();
                flags.extend(record.libs(is_framework));
                self.ui.show_details(&flags.join(" "));
            }
            ProbeOutcome::Absent { reason } => {
                self.absent += 1;
                let short = reason.short_reason();
                self.finish(|s| s.finish_skipped(short));
                self.ui.show_details(&reason.to_string());
            }
            ProbeOutcome::Skipped { reason } => {
                let result = format!("skipped ({})", reason);
                self.finish(|s| s.finish_skipped(&result));
            }
        }
    }

    fn finish(&mut self, f: impl FnOnce(&mut dyn SpinnerHandle)) {
        if let Some(mut spinner) = self.spinner.take() {
            f(spinner.as_mut());
        }
    }
}

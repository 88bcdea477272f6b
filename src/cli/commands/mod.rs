//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands that probe share
//! [`ProgressReporter`] for their `Checking for ...` lines.

pub mod completions;
pub mod configure;
pub mod dispatcher;
pub mod docs;
pub mod list;
pub mod probe;
pub mod progress;
pub mod schema;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use progress::ProgressReporter;

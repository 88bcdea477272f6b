//! Command-line interface for depprobe.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`context`] - Global flags resolved into manifest, platforms and paths
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;
pub mod context;

pub use args::{
    normalize_args, Cli, Commands, CompletionsArgs, ConfigureArgs, DocsArgs, ListArgs, ProbeArgs,
    WithPath,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
pub use context::ProbeContext;

//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::Path;

use crate::cli::args::{Cli, Commands, ConfigureArgs};
use crate::cli::context::ProbeContext;
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for status lines and messages
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: ProbeContext,
}

impl CommandDispatcher {
    /// Create a dispatcher for the given project root and global flags.
    pub fn new(project_root: &Path, cli: &Cli) -> Self {
        Self {
            context: ProbeContext::from_cli(project_root, cli),
        }
    }

    /// Create a dispatcher from an existing context.
    pub fn with_context(context: ProbeContext) -> Self {
        Self { context }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        self.context.project_root()
    }

    /// Dispatch and execute a command.
    ///
    /// With no subcommand, `configure` runs with its default arguments.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Configure(args)) => {
                let cmd =
                    super::configure::ConfigureCommand::new(self.context.clone(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Probe(args)) => {
                let cmd = super::probe::ProbeCommand::new(self.context.clone(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::List(args)) => {
                let cmd = super::list::ListCommand::new(self.context.clone(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Docs(args)) => {
                let cmd = super::docs::DocsCommand::new(self.context.clone(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Schema) => super::schema::SchemaCommand.execute(ui),
            Some(Commands::Completions(args)) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            None => {
                let cmd = super::configure::ConfigureCommand::new(
                    self.context.clone(),
                    ConfigureArgs::default(),
                );
                cmd.execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn dispatcher_creation() {
        let cli = Cli::parse_from(["depprobe"]);
        let dispatcher = CommandDispatcher::new(Path::new("/test"), &cli);
        assert_eq!(dispatcher.project_root(), Path::new("/test"));
    }

    #[test]
    fn dispatches_list() {
        let temp = tempfile::TempDir::new().unwrap();
        let cli = Cli::parse_from(["depprobe", "list"]);
        let dispatcher = CommandDispatcher::new(temp.path(), &cli);
        let mut ui = MockUI::new();
        let result = dispatcher.dispatch(&cli, &mut ui).unwrap();
        assert!(result.success);
    }
}

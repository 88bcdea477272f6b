//! Schema command implementation.
//!
//! `depprobe schema` prints the JSON Schema for `depprobe.yml`, for editor
//! integration.

use crate::config::manifest_schema;
use crate::error::Result;
use crate::output::write_output;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The schema command implementation.
pub struct SchemaCommand;

impl SchemaCommand {
    fn render(&self) -> Result<String> {
        let mut json =
            serde_json::to_string_pretty(&manifest_schema()).map_err(anyhow::Error::from)?;
        json.push('\n');
        Ok(json)
    }
}

impl Command for SchemaCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        write_output(&self.render()?, None)?;
        Ok(CommandResult::success())
    }
}

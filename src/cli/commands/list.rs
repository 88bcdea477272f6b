//! List command implementation.
//!
//! The `depprobe list` command shows every capability the registry knows
//! for the host, and the compiler-feature checks a configure run would do.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::args::ListArgs;
use crate::cli::context::ProbeContext;
use crate::error::Result;
use crate::output::write_output;
use crate::probe::{
    builtin_features, Capability, FeatureCheck, ProbeDefinition, OSX_FRAMEWORKS,
};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// One row of `depprobe list`.
#[derive(Debug, Serialize)]
struct CapabilityRow {
    name: String,
    kind: &'static str,
    mandatory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    version_files: Vec<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl From<&ProbeDefinition> for CapabilityRow {
    fn from(def: &ProbeDefinition) -> Self {
        Self {
            name: def.capability.name().to_string(),
            kind: if def.capability.is_builtin() {
                "builtin"
            } else {
                "custom"
            },
            mandatory: def.mandatory,
            min_version: def.min_version.map(|v| v.to_string()),
            version_files: def
                .version_files()
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            search_paths: def.search_paths.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FeatureRow {
    define: String,
    description: String,
}

#[derive(Debug, Serialize)]
struct Listing {
    host: String,
    capabilities: Vec<CapabilityRow>,
    features: Vec<FeatureRow>,
}

/// The list command implementation.
pub struct ListCommand {
    context: ProbeContext,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(context: ProbeContext, args: ListArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }

    fn listing(&self) -> Result<Listing> {
        let loaded = self.context.manifest()?;
        let platforms = self.context.platforms()?;
        let registry = self.context.registry(&loaded, &platforms)?;

        let mut capabilities: Vec<CapabilityRow> =
            registry.iter().map(CapabilityRow::from).collect();
        if platforms.host.is_macos() {
            capabilities.push(CapabilityRow {
                name: Capability::OsxFrameworks.name().to_string(),
                kind: "framework",
                mandatory: false,
                min_version: None,
                version_files: Vec::new(),
                search_paths: Vec::new(),
            });
        }

        let mut features = if loaded.manifest.builtin_features {
            builtin_features()
        } else {
            Vec::new()
        };
        features.extend(loaded.manifest.features.iter().map(FeatureCheck::from));
        let features = features
            .into_iter()
            .filter(|f| f.applies_to(&platforms.host))
            .map(|f| FeatureRow {
                define: f.define,
                description: f.description,
            })
            .collect();

        Ok(Listing {
            host: platforms.host.to_string(),
            capabilities,
            features,
        })
    }
}

fn render_text(listing: &Listing) -> String {
    let mut out = format!("Capabilities (host {}):\n", listing.host);
    for row in &listing.capabilities {
        let mut notes = vec![row.kind.to_string()];
        if row.mandatory {
            notes.push("mandatory".to_string());
        }
        if let Some(min) = &row.min_version {
            notes.push(format!(">= {}", min));
        }
        out.push_str(&format!("  {:<16} {}\n", row.name, notes.join(", ")));
        if row.kind == "framework" {
            out.push_str(&format!("    {}\n", OSX_FRAMEWORKS.join(" ")));
        }
    }

    out.push_str("\nFeatures:\n");
    if listing.features.is_empty() {
        out.push_str("  (none)\n");
    }
    for row in &listing.features {
        out.push_str(&format!("  {:<24} {}\n", row.define, row.description));
    }
    out
}

impl Command for ListCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let listing = self.listing()?;
        let rendered = if self.args.json {
            let mut json = serde_json::to_string_pretty(&listing).map_err(anyhow::Error::from)?;
            json.push('\n');
            json
        } else {
            render_text(&listing)
        };
        write_output(&rendered, None)?;
        Ok(CommandResult::success())
    }
}

//! Rendering of a finished [`ConfigEnvironment`].
//!
//! - [`OutputFormat::Summary`] - human-readable list of capabilities and defines
//! - [`OutputFormat::Json`] / [`OutputFormat::Yaml`] - the full report
//! - [`OutputFormat::Header`] - a C/C++ config header, see [`header`]
//! - [`OutputFormat::Cargo`] - build-script directives, see [`cargo`]

pub mod cargo;
pub mod header;

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;

use crate::error::Result;
use crate::probe::ConfigEnvironment;

/// Output format for probe results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain list of what was found
    #[default]
    Summary,
    /// JSON report
    Json,
    /// YAML report
    Yaml,
    /// C/C++ config header
    Header,
    /// cargo: directives for build scripts
    Cargo,
}

/// Serialized form of a run.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<&'a str>,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub environment: &'a ConfigEnvironment,
}

impl<'a> Report<'a> {
    pub fn new(environment: &'a ConfigEnvironment, project: Option<&'a str>) -> Self {
        Self {
            project,
            generated_at: Utc::now(),
            environment,
        }
    }
}

/// Render `env` in `format`.
pub fn render(
    env: &ConfigEnvironment,
    format: OutputFormat,
    project: Option<&str>,
) -> Result<String> {
    let rendered = match format {
        OutputFormat::Summary => render_summary(env),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&Report::new(env, project))
                .map_err(anyhow::Error::from)?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(&Report::new(env, project)).map_err(anyhow::Error::from)?
        }
        OutputFormat::Header => header::render_header(env, project, Utc::now()),
        OutputFormat::Cargo => cargo::render_cargo(env),
    };
    Ok(rendered)
}

fn render_summary(env: &ConfigEnvironment) -> String {
    let mut out = String::new();

    if let Some(compiler) = env.compiler() {
        out.push_str(&format!("compiler: {}\n", compiler));
    }
    out.push_str(&format!("host: {}\n", env.platforms().host));

    for (capability, record) in env.capabilities() {
        let version = record
            .version
            .map(|v| format!(" {}", v))
            .unwrap_or_default();
        out.push_str(&format!("{}{}\n", capability, version));
        let cflags = record.cflags();
        if !cflags.is_empty() {
            out.push_str(&format!("  cflags: {}\n", cflags.join(" ")));
        }
        let libs = record.libs(*capability == crate::probe::Capability::OsxFrameworks);
        if !libs.is_empty() {
            out.push_str(&format!("  libs: {}\n", libs.join(" ")));
        }
    }

    for (name, value) in env.defines() {
        out.push_str(&format!("#define {} {}\n", name, value));
    }

    out
}

/// Write rendered output to `path`, or to stdout when `None`.
pub fn write_output(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

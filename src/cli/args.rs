//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct. Call [`normalize_args`] on
//! the raw arguments first so the `--with-<lib>=PATH` spellings parse.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::output::OutputFormat;
use crate::probe::{Capability, Version};

/// depprobe - Native dependency discovery for C++ builds.
#[derive(Debug, Parser)]
#[command(name = "depprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to manifest (overrides depprobe.yml in the project root)
    #[arg(short, long, global = true, env = "DEPPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show compiler commands and output for failed checks
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Platform doing the build (target triple)
    #[arg(long, global = true, value_name = "TRIPLE")]
    pub build: Option<String>,

    /// Platform the result will run on (target triple)
    #[arg(long, global = true, value_name = "TRIPLE", env = "DEPPROBE_HOST")]
    pub host: Option<String>,

    /// Installation root for a capability; also spelled --with-<name>=PATH
    #[arg(long = "with", global = true, value_name = "NAME=PATH")]
    pub with: Vec<WithPath>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Probe every planned capability and feature (default if no command specified)
    Configure(ConfigureArgs),

    /// Probe a single capability
    Probe(ProbeArgs),

    /// List known capabilities and feature checks
    List(ListArgs),

    /// Show documentation metadata
    Docs(DocsArgs),

    /// Print the JSON Schema for depprobe.yml
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `configure` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigureArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Write output to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Skip compiler-feature checks
    #[arg(long)]
    pub skip_features: bool,
}

/// Arguments for the `probe` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ProbeArgs {
    /// Capability name (openssl, sqlite3, cryptopp, libxml2, osx-frameworks or a custom probe)
    pub name: String,

    /// Installation root to try first
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Minimum acceptable version
    #[arg(long, value_name = "VERSION")]
    pub min_version: Option<Version>,

    /// Treat a missing capability as an error
    #[arg(long)]
    pub mandatory: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `docs` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DocsArgs {
    /// Only list man pages
    #[arg(long)]
    pub man_pages: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// A `--with NAME=PATH` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithPath {
    pub capability: Capability,
    pub path: PathBuf,
}

impl FromStr for WithPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=PATH, got '{}'", s))?;
        if path.is_empty() {
            return Err(format!("missing path for '{}'", name));
        }
        let capability = name.parse().map_err(|e: crate::error::ProbeError| e.to_string())?;
        Ok(Self {
            capability,
            path: PathBuf::from(path),
        })
    }
}

/// Rewrite the configure-style spellings into `--with NAME=PATH`.
///
/// - `--with-openssl=/opt/ssl` and `--with-openssl /opt/ssl`
/// - `--openssl=/opt/ssl` for the built-in capability names
///
/// Arguments after `--` are left alone.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out = Vec::new();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            out.push(arg);
            out.extend(iter.by_ref());
            break;
        }

        if let Some(rest) = arg.strip_prefix("--with-") {
            match rest.split_once('=') {
                Some((name, path)) => {
                    out.push("--with".to_string());
                    out.push(format!("{}={}", name, path));
                }
                None => {
                    out.push("--with".to_string());
                    match iter.next() {
                        Some(path) => out.push(format!("{}={}", rest, path)),
                        None => out.push(rest.to_string()),
                    }
                }
            }
            continue;
        }

        if let Some((name, path)) = arg.strip_prefix("--").and_then(|r| r.split_once('=')) {
            if Capability::builtin_names().iter().any(|n| *n == name) {
                out.push("--with".to_string());
                out.push(format!("{}={}", name, path));
                continue;
            }
        }

        out.push(arg);
    }

    out
}

//! Build and host platform description.
//!
//! Platforms are given as target triples (`x86_64-apple-darwin`,
//! `aarch64-linux-gnu`) through `--build` / `--host`. Only the operating
//! system matters for probing: it decides the default search prefixes and
//! whether macOS frameworks are probed.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ProbeError;

/// Operating system family of a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    MacOS,
    Linux,
    FreeBsd,
    Windows,
    Other,
}

/// A platform identified by its target triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    triple: String,
    os: TargetOs,
}

impl Platform {
    /// The platform this process is running on.
    pub fn current() -> Self {
        let os = if cfg!(target_os = "macos") {
            TargetOs::MacOS
        } else if cfg!(target_os = "windows") {
            TargetOs::Windows
        } else if cfg!(target_os = "freebsd") {
            TargetOs::FreeBsd
        } else if cfg!(target_os = "linux") {
            TargetOs::Linux
        } else {
            TargetOs::Other
        };

        let suffix = match os {
            TargetOs::MacOS => "apple-darwin",
            TargetOs::Linux => "linux-gnu",
            TargetOs::FreeBsd => "unknown-freebsd",
            TargetOs::Windows => "pc-windows-msvc",
            TargetOs::Other => "unknown",
        };

        Self {
            triple: format!("{}-{}", std::env::consts::ARCH, suffix),
            os,
        }
    }

    /// The target triple as given.
    pub fn triple(&self) -> &str {
        &self.triple
    }

    /// Operating system family.
    pub fn os(&self) -> TargetOs {
        self.os
    }

    /// Whether this is a macOS platform.
    pub fn is_macos(&self) -> bool {
        self.os == TargetOs::MacOS
    }
}

impl FromStr for Platform {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let triple = s.trim();
        if triple.is_empty() || triple.split('-').count() < 2 {
            return Err(ProbeError::ConfigValidationError {
                message: format!("'{}' is not a target triple (expected e.g. x86_64-linux-gnu)", s),
            });
        }

        let lower = triple.to_ascii_lowercase();
        let os = if lower.contains("darwin") || lower.contains("macos") {
            TargetOs::MacOS
        } else if lower.contains("linux") {
            TargetOs::Linux
        } else if lower.contains("freebsd") {
            TargetOs::FreeBsd
        } else if lower.contains("windows") || lower.contains("mingw") {
            TargetOs::Windows
        } else {
            TargetOs::Other
        };

        Ok(Self {
            triple: triple.to_string(),
            os,
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.triple)
    }
}

/// The `--build` / `--host` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformPair {
    pub build: Platform,
    pub host: Platform,
}

impl PlatformPair {
    /// Build the pair from optional flags. `host` defaults to `build`, which
    /// defaults to the running machine.
    pub fn from_flags(build: Option<&str>, host: Option<&str>) -> Result<Self, ProbeError> {
        let build = match build {
            Some(b) => b.parse()?,
            None => Platform::current(),
        };
        let host = match host {
            Some(h) => h.parse()?,
            None => build.clone(),
        };
        Ok(Self { build, host })
    }

    /// Whether binaries are built for a different machine than the one running the build.
    pub fn is_cross(&self) -> bool {
        self.build.triple != self.host.triple
    }
}

impl Default for PlatformPair {
    fn default() -> Self {
        let current = Platform::current();
        Self {
            build: current.clone(),
            host: current,
        }
    }
}

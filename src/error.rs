//! Error types for depprobe operations.
//!
//! This module defines [`ProbeError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Probe failures (`NotFound`, `UnparsableVersion`, `VersionTooOld`,
//!   `LinkFailed`) are fatal for mandatory capabilities and demoted to
//!   "absent" for optional ones
//! - Use `anyhow::Error` (via `ProbeError::Other`) for unexpected errors
//! - Every message should tell the user what to do next

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for depprobe operations.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No installation root contained the capability's version file.
    #[error(
        "{capability} not found (searched: {}). Provide a path with --with-{capability}=PATH",
        format_searched(.searched)
    )]
    NotFound {
        capability: String,
        searched: Vec<PathBuf>,
    },

    /// The version file exists but the version pattern did not match.
    #[error("Could not parse {capability} version from {file}")]
    UnparsableVersion { capability: String, file: PathBuf },

    /// The discovered version is below the requested minimum.
    #[error("{capability} {found} is too old; at least {required} is required")]
    VersionTooOld {
        capability: String,
        found: String,
        required: String,
    },

    /// Compiling or linking the test fragment failed.
    #[error("Failed to compile and link against {capability}: {output}")]
    LinkFailed { capability: String, output: String },

    /// No working C++ compiler could be located.
    #[error("No working C++ compiler found (tried: {}). Set CXX to a compiler", .tried.join(", "))]
    CompilerNotFound { tried: Vec<String> },

    /// A version pattern is not a valid regular expression.
    #[error("Invalid version pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A version string could not be parsed.
    #[error("Invalid version '{0}'")]
    InvalidVersion(String),

    /// Capability name is not registered.
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    /// Manifest file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse manifest file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid manifest structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProbeError {
    /// Name of the capability this error concerns, if any.
    pub fn capability(&self) -> Option<&str> {
        match self {
            Self::NotFound { capability, .. }
            | Self::UnparsableVersion { capability, .. }
            | Self::VersionTooOld { capability, .. }
            | Self::LinkFailed { capability, .. } => Some(capability),
            _ => None,
        }
    }

    /// Short label used when an optional probe degrades to "absent".
    pub fn short_reason(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not found",
            Self::UnparsableVersion { .. } => "unparsable version",
            Self::VersionTooOld { .. } => "too old",
            Self::LinkFailed { .. } => "link failed",
            Self::CompilerNotFound { .. } => "no compiler",
            _ => "error",
        }
    }

    /// Whether this error comes from the manifest or command-line input
    /// rather than from probing.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigParseError { .. }
                | Self::ConfigValidationError { .. }
                | Self::InvalidPattern { .. }
                | Self::InvalidVersion(_)
                | Self::UnknownCapability(_)
        )
    }

    /// Process exit code: 2 for configuration problems, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_config_error() {
            2
        } else {
            1
        }
    }
}

fn format_searched(searched: &[PathBuf]) -> String {
    if searched.is_empty() {
        return "nothing".to_string();
    }
    searched
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for depprobe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_tells_user_to_provide_path() {
        let err = ProbeError::NotFound {
            capability: "openssl".into(),
            searched: vec![PathBuf::from("/usr"), PathBuf::from("/usr/local")],
        };
        let msg = err.to_string();
        assert!(msg.contains("openssl not found"));
        assert!(msg.contains("/usr, /usr/local"));
        assert!(msg.contains("--with-openssl=PATH"));
    }

    #[test]
    fn not_found_with_empty_search_list() {
        let err = ProbeError::NotFound {
            capability: "sqlite3".into(),
            searched: vec![],
        };
        assert!(err.to_string().contains("searched: nothing"));
    }

    #[test]
    fn version_too_old_displays_both_versions() {
        let err = ProbeError::VersionTooOld {
            capability: "openssl".into(),
            found: "0.9.8".into(),
            required: "1.0.2".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0.9.8"));
        assert!(msg.contains("1.0.2"));
    }

    #[test]
    fn compiler_not_found_lists_candidates() {
        let err = ProbeError::CompilerNotFound {
            tried: vec!["c++".into(), "g++".into()],
        };
        assert!(err.to_string().contains("c++, g++"));
    }

    #[test]
    fn capability_is_exposed_for_probe_errors() {
        let err = ProbeError::LinkFailed {
            capability: "cryptopp".into(),
            output: "undefined reference".into(),
        };
        assert_eq!(err.capability(), Some("cryptopp"));
        assert_eq!(err.short_reason(), "link failed");

        let err = ProbeError::InvalidVersion("x".into());
        assert_eq!(err.capability(), None);
    }

    #[test]
    fn config_errors_exit_with_two() {
        let err = ProbeError::ConfigNotFound {
            path: PathBuf::from("depprobe.yml"),
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(ProbeError::UnknownCapability("x".into()).exit_code(), 2);

        let err = ProbeError::NotFound {
            capability: "openssl".into(),
            searched: vec![],
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ProbeError = io_err.into();
        assert!(matches!(err, ProbeError::Io(_)));
    }
}

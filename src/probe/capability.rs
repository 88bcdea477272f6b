//! Capability names and registered capability records.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProbeError;
use crate::probe::version::Version;

/// An external dependency that can be probed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    OpenSsl,
    Sqlite3,
    CryptoPp,
    LibXml2,
    OsxFrameworks,
    /// A project-specific probe defined in the manifest.
    Custom(String),
}

impl Capability {
    /// All built-in capabilities, in default probing order.
    pub const BUILTIN: [Capability; 5] = [
        Capability::OpenSsl,
        Capability::Sqlite3,
        Capability::CryptoPp,
        Capability::LibXml2,
        Capability::OsxFrameworks,
    ];

    /// Stable lowercase name, as used in `--with-<name>` flags.
    pub fn name(&self) -> &str {
        match self {
            Capability::OpenSsl => "openssl",
            Capability::Sqlite3 => "sqlite3",
            Capability::CryptoPp => "cryptopp",
            Capability::LibXml2 => "libxml2",
            Capability::OsxFrameworks => "osx-frameworks",
            Capability::Custom(name) => name,
        }
    }

    /// Human-readable name for progress output.
    pub fn display_name(&self) -> &str {
        match self {
            Capability::OpenSsl => "OpenSSL",
            Capability::Sqlite3 => "SQLite3",
            Capability::CryptoPp => "Crypto++",
            Capability::LibXml2 => "libxml2",
            Capability::OsxFrameworks => "OS X frameworks",
            Capability::Custom(name) => name,
        }
    }

    /// Name of the `HAVE_*` define registered on success.
    pub fn define_name(&self) -> String {
        let upper: String = self
            .name()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("HAVE_{}", upper)
    }

    /// Whether this is one of the built-in capabilities.
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Capability::Custom(_))
    }

    /// Names accepted for the built-in capabilities, including aliases.
    pub fn builtin_names() -> Vec<&'static str> {
        vec![
            "openssl",
            "sqlite3",
            "sqlite",
            "cryptopp",
            "libxml2",
            "osx-frameworks",
        ]
    }
}

impl FromStr for Capability {
    type Err = ProbeError;

    /// Built-in names are matched case-insensitively; anything else that is a
    /// valid identifier becomes [`Capability::Custom`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let cap = match lower.as_str() {
            "openssl" => Capability::OpenSsl,
            "sqlite3" | "sqlite" => Capability::Sqlite3,
            "cryptopp" | "crypto++" => Capability::CryptoPp,
            "libxml2" | "xml2" => Capability::LibXml2,
            "osx-frameworks" | "frameworks" => Capability::OsxFrameworks,
            "" => return Err(ProbeError::UnknownCapability(s.to_string())),
            _ => {
                let valid = lower
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+');
                if !valid {
                    return Err(ProbeError::UnknownCapability(s.to_string()));
                }
                Capability::Custom(lower)
            }
        };
        Ok(cap)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A fully registered capability, ready for downstream build steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRecord {
    /// Header search path (`-I`), if any.
    pub include_path: Option<PathBuf>,
    /// Libraries to link (`-l`), or frameworks for `osx-frameworks`.
    pub library_names: Vec<String>,
    /// Library search path (`-L`), if any.
    pub library_path: Option<PathBuf>,
    /// Version parsed from the version header.
    pub version: Option<Version>,
    /// Extra link flags that were needed (e.g. the alternate flag set).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_flags: Vec<String>,
    /// Preprocessor define, e.g. `HAVE_OPENSSL`.
    pub define: String,
    /// Whether the define is set. Always true for registered records.
    pub defined: bool,
}

impl CapabilityRecord {
    /// Compiler flags for this record (`-I...`).
    pub fn cflags(&self) -> Vec<String> {
        self.include_path
            .iter()
            .map(|p| format!("-I{}", p.display()))
            .collect()
    }

    /// Linker flags for this record (`-L... -l...`).
    pub fn libs(&self, is_framework: bool) -> Vec<String> {
        let mut flags: Vec<String> = self
            .library_path
            .iter()
            .map(|p| format!("-L{}", p.display()))
            .collect();
        for lib in &self.library_names {
            if is_framework {
                flags.push("-framework".to_string());
                flags.push(lib.clone());
            } else {
                flags.push(format!("-l{}", lib));
            }
        }
        flags.extend(self.extra_flags.iter().cloned());
        flags
    }
}

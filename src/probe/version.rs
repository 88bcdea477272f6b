//! Version numbers and version-header parsing.
//!
//! Libraries publish their version in a header in one of a few shapes:
//! a dotted string (`#define SQLITE_VERSION "3.31.1"`), a packed hex
//! number (`#define OPENSSL_VERSION_NUMBER 0x30000020L`) or a plain
//! decimal (`#define CRYPTOPP_VERSION 565`). [`VersionEncoding`] names the
//! shape and [`parse_version_text`] turns the header text into a
//! [`Version`].

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ProbeError, Result};

/// A numeric `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether this version satisfies a `>= minimum` requirement.
    pub fn at_least(&self, minimum: &Version) -> bool {
        self >= minimum
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = ProbeError;

    /// Parse `1`, `1.2` or `1.2.3`. Missing components are zero.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_start_matches('v');
        let parts: Vec<&str> = trimmed.split('.').collect();
        if trimmed.is_empty() || parts.len() > 3 {
            return Err(ProbeError::InvalidVersion(s.to_string()));
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| ProbeError::InvalidVersion(s.to_string()))?;
        }

        Ok(Version::new(numbers[0], numbers[1], numbers[2]))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for Version {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "Version".into()
    }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "string",
            "pattern": r"^v?\d+(\.\d+){0,2}$",
            "description": "Version as major[.minor[.patch]]"
        })
    }
}

/// How the text captured from a version header encodes the version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VersionEncoding {
    /// Dotted string such as `3.31.1`.
    #[default]
    Dotted,
    /// Packed hex number `0xMNN00PPS` (major, minor, patch nibbles).
    PackedHex,
    /// Decimal with one digit per component, e.g. `565` for 5.6.5.
    Decimal,
}

impl VersionEncoding {
    /// Decode a single captured token.
    pub fn decode(&self, raw: &str) -> Option<Version> {
        let raw = raw.trim();
        match self {
            VersionEncoding::Dotted => raw.parse().ok(),
            VersionEncoding::PackedHex => {
                let digits = raw
                    .trim_start_matches("0x")
                    .trim_start_matches("0X")
                    .trim_end_matches(['L', 'l', 'U', 'u']);
                let value = u64::from_str_radix(digits, 16).ok()?;
                Some(Version::new(
                    ((value >> 28) & 0xf) as u32,
                    ((value >> 20) & 0xff) as u32,
                    ((value >> 4) & 0xff) as u32,
                ))
            }
            VersionEncoding::Decimal => {
                let value: u32 = raw.parse().ok()?;
                if value < 100 {
                    return Some(Version::new(value / 10, value % 10, 0));
                }
                Some(Version::new(value / 100, (value / 10) % 10, value % 10))
            }
        }
    }
}

/// Compile a version pattern, reporting bad patterns as configuration errors.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    let re = Regex::new(pattern).map_err(|e| ProbeError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    match re.captures_len() - 1 {
        1 | 2 => Ok(re),
        n => Err(ProbeError::InvalidPattern {
            pattern: pattern.to_string(),
            message: format!("expected one or two capture groups, found {}", n),
        }),
    }
}

/// Extract a version from header text.
///
/// With one capture group the token is decoded per `encoding`. With two
/// groups they are read as plain `major` and `minor` numbers.
/// Returns `None` when the pattern does not match or the token is malformed;
/// callers turn that into [`ProbeError::UnparsableVersion`].
pub fn parse_version_text(
    text: &str,
    pattern: &Regex,
    encoding: VersionEncoding,
) -> Option<Version> {
    let caps = pattern.captures(text)?;
    match (caps.get(1), caps.get(2)) {
        (Some(major), Some(minor)) => Some(Version::new(
            major.as_str().trim().parse().ok()?,
            minor.as_str().trim().parse().ok()?,
            0,
        )),
        (Some(token), None) => encoding.decode(token.as_str()),
        _ => None,
    }
}

//! Probe definitions and the registry of known probes.
//!
//! A [`ProbeDefinition`] says where to look for a library, how to read its
//! version and what to compile against it. The registry holds the built-in
//! definitions and any custom ones from the manifest.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CustomProbeConfig;
use crate::error::Result;
use crate::probe::capability::Capability;
use crate::probe::version::{compile_pattern, Version, VersionEncoding};
use crate::toolchain::{Platform, TargetOs};

/// Conventional installation prefixes searched on every platform.
pub const DEFAULT_PREFIXES: &[&str] = &["/usr", "/usr/local", "/opt/local", "/sw"];

/// A header that may carry the version, and how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSource {
    /// Header relative to the root.
    pub file: PathBuf,
    /// Pattern with one or two capture groups.
    pub pattern: String,
    pub encoding: VersionEncoding,
}

impl VersionSource {
    pub fn new(
        file: impl Into<PathBuf>,
        pattern: impl Into<String>,
        encoding: VersionEncoding,
    ) -> Self {
        Self {
            file: file.into(),
            pattern: pattern.into(),
            encoding,
        }
    }
}

/// Everything needed to probe one capability.
#[derive(Debug, Clone)]
pub struct ProbeDefinition {
    pub capability: Capability,
    /// Candidate roots, searched in order.
    pub search_paths: Vec<PathBuf>,
    /// Where the version is read from, tried in order.
    pub version_sources: Vec<VersionSource>,
    /// Header directory relative to the root.
    pub include_subdir: PathBuf,
    /// Library directories relative to the root, in preference order.
    pub lib_subdirs: Vec<PathBuf>,
    pub libraries: Vec<String>,
    /// Program compiled and linked to confirm the library works.
    pub fragment: String,
    /// Flags appended when the first compile attempt fails.
    pub alternate_flags: Vec<String>,
    pub mandatory: bool,
    pub min_version: Option<Version>,
}

impl ProbeDefinition {
    /// Built-in definition for `capability` on `host`.
    ///
    /// Returns `None` for [`Capability::OsxFrameworks`] (which has no
    /// version header) and for custom capabilities.
    pub fn builtin(capability: &Capability, host: &Platform) -> Option<Self> {
        let def = match capability {
            Capability::OpenSsl => Self {
                capability: Capability::OpenSsl,
                search_paths: default_search_paths(
                    host,
                    &["openssl@3", "openssl@1.1", "openssl"],
                ),
                // 3.x computes OPENSSL_VERSION_NUMBER from the MAJOR/MINOR
                // macros, so only 1.x headers carry the hex literal.
                version_sources: vec![
                    VersionSource::new(
                        "include/openssl/opensslv.h",
                        r"#\s*define\s+OPENSSL_VERSION_NUMBER\s+(0x[0-9a-fA-F]+)L?",
                        VersionEncoding::PackedHex,
                    ),
                    VersionSource::new(
                        "include/openssl/opensslv.h",
                        concat!(
                            r"#\s*define\s+OPENSSL_VERSION_MAJOR\s+(\d+)",
                            r"[\s\S]*?#\s*define\s+OPENSSL_VERSION_MINOR\s+(\d+)",
                        ),
                        VersionEncoding::Dotted,
                    ),
                ],
                include_subdir: PathBuf::from("include"),
                lib_subdirs: default_lib_subdirs(host),
                libraries: vec!["ssl".to_string(), "crypto".to_string()],
                fragment: OPENSSL_FRAGMENT.to_string(),
                alternate_flags: vec!["-ldl".to_string(), "-lpthread".to_string()],
                mandatory: true,
                min_version: Some(Version::new(1, 0, 2)),
            },
            Capability::Sqlite3 => Self {
                capability: Capability::Sqlite3,
                search_paths: default_search_paths(host, &["sqlite"]),
                version_sources: vec![VersionSource::new(
                    "include/sqlite3.h",
                    r#"#\s*define\s+SQLITE_VERSION\s+"([0-9.]+)""#,
                    VersionEncoding::Dotted,
                )],
                include_subdir: PathBuf::from("include"),
                lib_subdirs: default_lib_subdirs(host),
                libraries: vec!["sqlite3".to_string()],
                fragment: SQLITE3_FRAGMENT.to_string(),
                alternate_flags: vec!["-lpthread".to_string()],
                mandatory: true,
                min_version: None,
            },
            Capability::CryptoPp => Self {
                capability: Capability::CryptoPp,
                search_paths: default_search_paths(host, &["cryptopp"]),
                // 8.3 moved the version out of config.h.
                version_sources: ["config_ver.h", "config.h"]
                    .iter()
                    .map(|header| {
                        VersionSource::new(
                            Path::new("include/cryptopp").join(header),
                            r"#\s*define\s+CRYPTOPP_VERSION\s+(\d+)",
                            VersionEncoding::Decimal,
                        )
                    })
                    .collect(),
                include_subdir: PathBuf::from("include"),
                lib_subdirs: default_lib_subdirs(host),
                libraries: vec!["cryptopp".to_string()],
                fragment: CRYPTOPP_FRAGMENT.to_string(),
                alternate_flags: vec!["-lpthread".to_string()],
                mandatory: false,
                min_version: Some(Version::new(5, 6, 1)),
            },
            Capability::LibXml2 => Self {
                capability: Capability::LibXml2,
                search_paths: default_search_paths(host, &["libxml2"]),
                version_sources: vec![VersionSource::new(
                    "include/libxml2/libxml/xmlversion.h",
                    r#"#\s*define\s+LIBXML_DOTTED_VERSION\s+"([0-9.]+)""#,
                    VersionEncoding::Dotted,
                )],
                include_subdir: PathBuf::from("include/libxml2"),
                lib_subdirs: default_lib_subdirs(host),
                libraries: vec!["xml2".to_string()],
                fragment: LIBXML2_FRAGMENT.to_string(),
                alternate_flags: vec!["-lz".to_string(), "-lm".to_string()],
                mandatory: false,
                min_version: None,
            },
            Capability::OsxFrameworks | Capability::Custom(_) => return None,
        };
        Some(def)
    }

    /// Build a definition from a manifest entry.
    pub fn from_custom(config: &CustomProbeConfig, host: &Platform) -> Result<Self> {
        compile_pattern(&config.version_pattern)?;

        let search_paths = if config.search_paths.is_empty() {
            default_search_paths(host, &[])
        } else {
            config.search_paths.clone()
        };

        Ok(Self {
            capability: Capability::Custom(config.name.to_ascii_lowercase()),
            search_paths,
            version_sources: vec![VersionSource::new(
                config.version_file.clone(),
                config.version_pattern.clone(),
                config.encoding,
            )],
            include_subdir: config
                .include_subdir
                .clone()
                .unwrap_or_else(|| PathBuf::from("include")),
            lib_subdirs: config
                .lib_subdir
                .clone()
                .map(|d| vec![d])
                .unwrap_or_else(|| default_lib_subdirs(host)),
            libraries: config.libraries.clone(),
            fragment: config.fragment.clone(),
            alternate_flags: config.alternate_flags.clone(),
            mandatory: config.mandatory,
            min_version: config.min_version,
        })
    }

    /// Header directory under `root`.
    pub fn include_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.include_subdir)
    }

    /// Distinct version headers, in the order they are tried.
    pub fn version_files(&self) -> Vec<&Path> {
        let mut files: Vec<&Path> = Vec::new();
        for source in &self.version_sources {
            if !files.contains(&source.file.as_path()) {
                files.push(&source.file);
            }
        }
        files
    }

    /// Library directory under `root`.
    ///
    /// The first configured subdirectory that holds one of the libraries
    /// wins. Without such a directory the first existing one is used, else
    /// the first configured one.
    pub fn library_dir(&self, root: &Path) -> PathBuf {
        let dirs: Vec<PathBuf> = self.lib_subdirs.iter().map(|sub| root.join(sub)).collect();
        dirs.iter()
            .find(|dir| self.libraries.iter().any(|lib| holds_library(dir, lib)))
            .or_else(|| dirs.iter().find(|dir| dir.is_dir()))
            .or_else(|| dirs.first())
            .cloned()
            .unwrap_or_else(|| root.join("lib"))
    }
}

/// Whether `dir` contains a static or shared build of `lib<name>`.
fn holds_library(dir: &Path, name: &str) -> bool {
    let stem = format!("lib{}", name);
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.filter_map(|entry| entry.ok()).any(|entry| {
        let file = entry.file_name();
        let file = file.to_string_lossy();
        file.strip_prefix(&stem).is_some_and(|rest| {
            rest == ".a"
                || rest == ".so"
                || rest.starts_with(".so.")
                || (rest.starts_with('.') && rest.ends_with(".dylib"))
        })
    })
}

/// Default roots for a dependency on `host`.
///
/// macOS hosts additionally search Homebrew prefixes, including the
/// keg-only `opt/<formula>` directories for each of `formulae`.
pub fn default_search_paths(host: &Platform, formulae: &[&str]) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = DEFAULT_PREFIXES.iter().map(PathBuf::from).collect();

    if host.is_macos() {
        paths.push(PathBuf::from("/opt/homebrew"));
        for formula in formulae {
            paths.push(PathBuf::from(format!("/opt/homebrew/opt/{}", formula)));
            paths.push(PathBuf::from(format!("/usr/local/opt/{}", formula)));
        }
    }

    paths
}

/// Library subdirectories for `host`: the Debian multiarch directory on
/// Linux, then `lib64`, then `lib`.
fn default_lib_subdirs(host: &Platform) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if host.os() == TargetOs::Linux {
        dirs.push(Path::new("lib").join(multiarch_name(host)));
    }
    dirs.push(PathBuf::from("lib64"));
    dirs.push(PathBuf::from("lib"));
    dirs
}

/// Multiarch tuple for a Linux host: `x86_64-unknown-linux-gnu` becomes
/// `x86_64-linux-gnu`, `i686-linux-gnu` becomes `i386-linux-gnu`.
fn multiarch_name(host: &Platform) -> String {
    let mut parts: Vec<&str> = host.triple().split('-').collect();
    if parts.len() == 4 {
        parts.remove(1);
    }
    if matches!(parts[0], "i486" | "i586" | "i686") {
        parts[0] = "i386";
    }
    parts.join("-")
}

/// Registry of probe definitions, keyed by capability.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    definitions: BTreeMap<Capability, ProbeDefinition>,
}

impl DefinitionRegistry {
    /// Create a registry with the built-in definitions for `host`.
    pub fn new(host: &Platform) -> Self {
        let definitions = Capability::BUILTIN
            .iter()
            .filter_map(|cap| ProbeDefinition::builtin(cap, host))
            .map(|def| (def.capability.clone(), def))
            .collect();
        Self { definitions }
    }

    /// Create a registry with built-ins plus custom definitions.
    pub fn with_custom(host: &Platform, custom: &[CustomProbeConfig]) -> Result<Self> {
        let mut registry = Self::new(host);
        for config in custom {
            let def = ProbeDefinition::from_custom(config, host)?;
            registry.insert(def);
        }
        Ok(registry)
    }

    /// Add or replace a definition.
    pub fn insert(&mut self, definition: ProbeDefinition) {
        self.definitions
            .insert(definition.capability.clone(), definition);
    }

    /// Look up a definition.
    pub fn get(&self, capability: &Capability) -> Option<&ProbeDefinition> {
        self.definitions.get(capability)
    }

    /// Check if a capability has a definition.
    pub fn contains(&self, capability: &Capability) -> bool {
        self.definitions.contains_key(capability)
    }

    /// All registered definitions.
    pub fn iter(&self) -> impl Iterator<Item = &ProbeDefinition> {
        self.definitions.values()
    }
}

const OPENSSL_FRAGMENT: &str = r#"#include <openssl/crypto.h>
#include <openssl/rand.h>

int
main()
{
  unsigned char buf[4];
  return RAND_bytes(buf, sizeof(buf)) == 1 ? 0 : 1;
}
"#;

const SQLITE3_FRAGMENT: &str = r#"#include <sqlite3.h>

int
main()
{
  return sqlite3_libversion_number() > 0 ? 0 : 1;
}
"#;

const CRYPTOPP_FRAGMENT: &str = r#"#include <cryptopp/sha.h>

int
main()
{
  CryptoPP::SHA256 hash;
  return hash.DigestSize() == 32 ? 0 : 1;
}
"#;

const LIBXML2_FRAGMENT: &str = r#"#include <libxml/xmlversion.h>
#include <libxml/parser.h>

int
main()
{
  xmlCheckVersion(LIBXML_VERSION);
  return 0;
}
"#;

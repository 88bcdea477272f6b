//! Manifest schema types.
//!
//! These types mirror the structure of `depprobe.yml`:
//!
//! ```yaml
//! project: myapp
//! capabilities:
//!   openssl:
//!     min_version: "1.1.0"
//!   sqlite3:
//!   libxml2:
//!     mandatory: true
//!     path: /opt/libxml2
//! custom:
//!   - name: zlib
//!     version_file: include/zlib.h
//!     version_pattern: '#define ZLIB_VERSION "([0-9.]+)"'
//!     libraries: [z]
//!     fragment: |
//!       #include <zlib.h>
//!       int main() { return zlibVersion() == 0; }
//! features:
//!   - define: HAVE_STD_OPTIONAL
//!     fragment: "#include <optional>\nint main() { std::optional<int> o; return 0; }"
//!     flags: ["-std=c++17"]
//! ```

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::docs::DocsConfig;
use crate::probe::version::{Version, VersionEncoding};

/// Root manifest structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProbeManifest {
    /// Project name, used in header guards and output.
    #[serde(default)]
    pub project: Option<String>,

    /// Capabilities to probe, in probing order. Empty means the default set.
    #[serde(default, with = "capability_map")]
    #[schemars(with = "std::collections::BTreeMap<String, Option<CapabilityEntry>>")]
    pub capabilities: Vec<CapabilityEntry>,

    /// Project-specific probe definitions.
    #[serde(default)]
    pub custom: Vec<CustomProbeConfig>,

    /// Run the built-in compiler-feature checks.
    #[serde(default = "default_true")]
    pub builtin_features: bool,

    /// Additional compiler-feature checks.
    #[serde(default)]
    pub features: Vec<FeatureConfig>,

    /// Documentation metadata.
    #[serde(default)]
    pub docs: Option<DocsConfig>,
}

impl Default for ProbeManifest {
    fn default() -> Self {
        Self {
            project: None,
            capabilities: Vec::new(),
            custom: Vec::new(),
            builtin_features: true,
            features: Vec::new(),
            docs: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Per-capability overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CapabilityEntry {
    /// Capability name; the key in the `capabilities` map.
    #[serde(skip)]
    pub name: String,

    /// Abort the run if the capability is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,

    /// Minimum acceptable version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<Version>,

    /// Installation root to try before the search list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl CapabilityEntry {
    /// An entry with no overrides.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A project-specific capability probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CustomProbeConfig {
    /// Capability name, used for `--with-<name>` and `HAVE_<NAME>`.
    pub name: String,

    /// Candidate roots. Defaults to the standard prefixes.
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Version header relative to a root.
    pub version_file: PathBuf,

    /// Regular expression with one or two capture groups.
    pub version_pattern: String,

    #[serde(default)]
    pub encoding: VersionEncoding,

    /// Header directory relative to the root (default `include`).
    #[serde(default)]
    pub include_subdir: Option<PathBuf>,

    /// Library directory relative to the root (default: the multiarch dir,
    /// `lib64` or `lib`, whichever holds the library).
    #[serde(default)]
    pub lib_subdir: Option<PathBuf>,

    /// Libraries to link, without the `-l` prefix.
    #[serde(default)]
    pub libraries: Vec<String>,

    /// Program compiled and linked to confirm the library works.
    pub fragment: String,

    /// Flags added on the retry after a failed link.
    #[serde(default)]
    pub alternate_flags: Vec<String>,

    #[serde(default)]
    pub mandatory: bool,

    #[serde(default)]
    pub min_version: Option<Version>,
}

/// A compiler-feature check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FeatureConfig {
    /// Macro defined when the fragment compiles.
    pub define: String,

    #[serde(default)]
    pub description: Option<String>,

    pub fragment: String,

    #[serde(default)]
    pub flags: Vec<String>,
}

/// `capabilities` is written as a map but its order matters, so it is kept
/// as a list of entries named after their keys.
mod capability_map {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    use super::CapabilityEntry;
    use crate::probe::capability::Capability;

    /// Aliases share a name; unknown names are left for the validator.
    fn canonical_name(name: &str) -> String {
        name.parse::<Capability>()
            .map(|cap| cap.name().to_string())
            .unwrap_or_else(|_| name.to_ascii_lowercase())
    }

    pub fn serialize<S: Serializer>(
        entries: &[CapabilityEntry],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for entry in entries {
            map.serialize_entry(&entry.name, entry)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<CapabilityEntry>, D::Error> {
        deserializer.deserialize_any(EntriesVisitor)
    }

    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<CapabilityEntry>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of capability names to settings")
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut entries: Vec<CapabilityEntry> = Vec::new();
            while let Some((name, entry)) =
                access.next_entry::<String, Option<CapabilityEntry>>()?
            {
                let key = canonical_name(&name);
                if let Some(first) = entries.iter().find(|e| canonical_name(&e.name) == key) {
                    return Err(serde::de::Error::custom(if first.name == name {
                        format!("capability '{}' listed twice", name)
                    } else {
                        format!(
                            "capability '{}' listed twice (as '{}' and '{}')",
                            key, first.name, name
                        )
                    }));
                }
                let mut entry = entry.unwrap_or_default();
                entry.name = name;
                entries.push(entry);
            }
            Ok(entries)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manifest_uses_defaults() {
        let manifest: ProbeManifest = serde_yaml::from_str("project: demo").unwrap();
        assert_eq!(manifest.project.as_deref(), Some("demo"));
        assert!(manifest.capabilities.is_empty());
        assert!(manifest.builtin_features);
        assert!(manifest.docs.is_none());
    }

    #[test]
    fn capabilities_keep_document_order() {
        let yaml = r#"
capabilities:
  sqlite3:
  openssl:
    min_version: "1.1.0"
    path: /opt/ssl
  cryptopp:
    mandatory: true
"#;
        let manifest: ProbeManifest = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<&str> = manifest
            .capabilities
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["sqlite3", "openssl", "cryptopp"]);
        assert_eq!(manifest.capabilities[1].min_version, Some(Version::new(1, 1, 0)));
        assert_eq!(manifest.capabilities[1].path, Some(PathBuf::from("/opt/ssl")));
        assert_eq!(manifest.capabilities[2].mandatory, Some(true));
    }

    #[test]
    fn alias_and_canonical_name_cannot_both_be_listed() {
        let yaml = "capabilities:\n  sqlite:\n  sqlite3:\n    mandatory: true\n";
        let err = serde_yaml::from_str::<ProbeManifest>(yaml).unwrap_err();
        assert!(err
            .to_string()
            .contains("capability 'sqlite3' listed twice (as 'sqlite' and 'sqlite3')"));

        let yaml = "capabilities:\n  OpenSSL:\n  openssl:\n";
        assert!(serde_yaml::from_str::<ProbeManifest>(yaml).is_err());
    }

    #[test]
    fn alias_keys_are_kept_as_written() {
        let yaml = "capabilities:\n  xml2:\n    path: /opt/xml\n";
        let manifest: ProbeManifest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(manifest.capabilities[0].name, "xml2");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<ProbeManifest, _> = serde_yaml::from_str("capabilites: {}");
        assert!(result.is_err());

        let result: Result<ProbeManifest, _> =
            serde_yaml::from_str("capabilities:\n  openssl:\n    minimum: 1.0");
        assert!(result.is_err());
    }

    #[test]
    fn custom_probe_defaults() {
        let yaml = r#"
custom:
  - name: zlib
    version_file: include/zlib.h
    version_pattern: 'ZLIB_VERSION "([0-9.]+)"'
    fragment: "int main() { return 0; }"
"#;
        let manifest: ProbeManifest = serde_yaml::from_str(yaml).unwrap();
        let zlib = &manifest.custom[0];
        assert_eq!(zlib.encoding, VersionEncoding::Dotted);
        assert!(!zlib.mandatory);
        assert!(zlib.search_paths.is_empty());
        assert!(zlib.include_subdir.is_none());
    }

    #[test]
    fn capabilities_serialize_back_to_a_map() {
        let mut manifest = ProbeManifest::default();
        manifest.capabilities.push(CapabilityEntry::named("openssl"));
        let yaml = serde_yaml::to_string(&manifest).unwrap();
        assert!(yaml.contains("openssl: {}"));

        let back: ProbeManifest = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.capabilities[0].name, "openssl");
    }

    #[test]
    fn builtin_features_can_be_disabled() {
        let manifest: ProbeManifest = serde_yaml::from_str("builtin_features: false").unwrap();
        assert!(!manifest.builtin_features);
    }
}

//! Manifest discovery and loading.
//!
//! This module finds `depprobe.yml` and its local override and turns them
//! into a [`ProbeManifest`].

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;

use crate::config::merger::merge_manifests;
use crate::config::schema::ProbeManifest;
use crate::error::{ProbeError, Result};

/// Manifest file name in the project root.
pub const MANIFEST_FILE: &str = "depprobe.yml";

/// Uncommitted local overrides, layered over [`MANIFEST_FILE`].
pub const LOCAL_MANIFEST_FILE: &str = "depprobe.local.yml";

/// Paths to manifest files in merge order (later overrides earlier).
#[derive(Debug, Clone)]
pub struct ManifestPaths {
    /// Project manifest: depprobe.yml
    pub project: Option<PathBuf>,

    /// Local overrides: depprobe.local.yml
    pub project_local: Option<PathBuf>,
}

impl ManifestPaths {
    /// Discover manifest files in `project_root`.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            project: existing(project_root.join(MANIFEST_FILE)),
            project_local: existing(project_root.join(LOCAL_MANIFEST_FILE)),
        }
    }

    /// Returns all existing manifest paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(self.project_local.iter()).collect()
    }

    /// Check if a project manifest exists.
    pub fn has_project_manifest(&self) -> bool {
        self.project.is_some()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

/// A loaded manifest and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub manifest: ProbeManifest,
    /// Files that contributed, in merge order. Empty for the built-in default.
    pub sources: Vec<PathBuf>,
}

impl LoadedManifest {
    /// Whether the built-in default manifest is in use.
    pub fn is_default(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Find the project root by walking up from `start`.
///
/// Looks for:
/// 1. `depprobe.yml` (primary indicator)
/// 2. `.git` directory (fallback)
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(MANIFEST_FILE).is_file() {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a single manifest file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_manifest_file(path: &Path) -> Result<ProbeManifest> {
    let value = load_manifest_value(path)?;
    from_value(value, path)
}

/// Parse YAML content into a manifest.
pub fn parse_manifest(content: &str, source_path: &Path) -> Result<ProbeManifest> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| ProbeError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })?;
    from_value(value, source_path)
}

/// Load a manifest file as a raw YAML value, for merging.
///
/// An empty file yields an empty mapping.
pub fn load_manifest_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProbeError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ProbeError::Io(e)
        }
    })?;

    let value: Value = serde_yaml::from_str(&content).map_err(|e| ProbeError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(if value.is_null() {
        Value::Mapping(Default::default())
    } else {
        value
    })
}

fn from_value(value: Value, path: &Path) -> Result<ProbeManifest> {
    let value = if value.is_null() {
        Value::Mapping(Default::default())
    } else {
        value
    };
    serde_yaml::from_value(value).map_err(|e| ProbeError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the manifest for a project.
///
/// If `manifest_override` is given, only that file is loaded and it must
/// exist. Otherwise `depprobe.yml` and `depprobe.local.yml` are merged; if
/// neither exists the built-in default manifest is returned.
pub fn load_manifest(
    project_root: &Path,
    manifest_override: Option<&Path>,
) -> Result<LoadedManifest> {
    if let Some(path) = manifest_override {
        debug!("Loading manifest from {}", path.display());
        return Ok(LoadedManifest {
            manifest: load_manifest_file(path)?,
            sources: vec![path.to_path_buf()],
        });
    }

    let paths = ManifestPaths::discover(project_root);
    let sources: Vec<PathBuf> = paths.all_existing().into_iter().cloned().collect();
    if sources.is_empty() {
        debug!(
            "No {} in {}, using the default plan",
            MANIFEST_FILE,
            project_root.display()
        );
        return Ok(LoadedManifest {
            manifest: ProbeManifest::default(),
            sources,
        });
    }

    let mut layers = Vec::new();
    for path in &sources {
        debug!("Loading manifest layer {}", path.display());
        layers.push(load_manifest_value(path)?);
    }

    let merged = merge_manifests(&layers);
    let manifest = serde_yaml::from_value(merged).map_err(|e| ProbeError::ConfigParseError {
        path: sources[0].clone(),
        message: format!("Failed to parse merged manifest: {}", e),
    })?;

    Ok(LoadedManifest { manifest, sources })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::version::Version;
    use tempfile::TempDir;

    #[test]
    fn discover_finds_manifest_and_local() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), "").unwrap();
        fs::write(temp.path().join(LOCAL_MANIFEST_FILE), "").unwrap();

        let paths = ManifestPaths::discover(temp.path());
        assert!(paths.has_project_manifest());
        assert_eq!(paths.all_existing().len(), 2);
        assert!(paths.all_existing()[0].ends_with(MANIFEST_FILE));
    }

    #[test]
    fn discover_returns_none_for_missing_files() {
        let temp = TempDir::new().unwrap();
        let paths = ManifestPaths::discover(temp.path());
        assert!(paths.project.is_none());
        assert!(paths.project_local.is_none());
    }

    #[test]
    fn find_project_root_finds_manifest() {
        let temp = TempDir::new().unwrap();
        let subdir = temp.path().join("src").join("net");
        fs::create_dir_all(&subdir).unwrap();
        fs::write(temp.path().join(MANIFEST_FILE), "").unwrap();

        assert_eq!(find_project_root(&subdir), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn find_project_root_prefers_manifest_over_git() {
        let temp = TempDir::new().unwrap();
        let subdir = temp.path().join("nested");
        fs::create_dir_all(&subdir).unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        fs::write(subdir.join(MANIFEST_FILE), "").unwrap();

        assert_eq!(find_project_root(&subdir), Some(subdir));
    }

    #[test]
    fn missing_manifest_gives_default() {
        let temp = TempDir::new().unwrap();
        let loaded = load_manifest(temp.path(), None).unwrap();
        assert!(loaded.is_default());
        assert_eq!(loaded.manifest, ProbeManifest::default());
    }

    #[test]
    fn missing_override_is_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_manifest(temp.path(), Some(&temp.path().join("nope.yml")));
        assert!(matches!(result, Err(ProbeError::ConfigNotFound { .. })));
    }

    #[test]
    fn empty_file_parses_as_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(MANIFEST_FILE);
        fs::write(&path, "").unwrap();

        let manifest = load_manifest_file(&path).unwrap();
        assert_eq!(manifest, ProbeManifest::default());
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let result = parse_manifest("capabilities: [", Path::new("depprobe.yml"));
        assert!(matches!(result, Err(ProbeError::ConfigParseError { .. })));
    }

    #[test]
    fn local_overrides_project() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(MANIFEST_FILE),
            r#"
project: demo
capabilities:
  openssl:
    min_version: "1.0.2"
  sqlite3: {}
"#,
        )
        .unwrap();
        fs::write(
            temp.path().join(LOCAL_MANIFEST_FILE),
            r#"
capabilities:
  openssl:
    path: /opt/local
"#,
        )
        .unwrap();

        let loaded = load_manifest(temp.path(), None).unwrap();
        assert_eq!(loaded.sources.len(), 2);
        let manifest = loaded.manifest;
        assert_eq!(manifest.project.as_deref(), Some("demo"));
        assert_eq!(manifest.capabilities.len(), 2);
        let openssl = &manifest.capabilities[0];
        assert_eq!(openssl.name, "openssl");
        assert_eq!(openssl.min_version, Some(Version::new(1, 0, 2)));
        assert_eq!(openssl.path, Some(PathBuf::from("/opt/local")));
    }

    #[test]
    fn override_skips_local_layer() {
        let temp = TempDir::new().unwrap();
        let custom = temp.path().join("ci.yml");
        fs::write(&custom, "project: ci").unwrap();
        fs::write(temp.path().join(LOCAL_MANIFEST_FILE), "project: local").unwrap();

        let loaded = load_manifest(temp.path(), Some(&custom)).unwrap();
        assert_eq!(loaded.manifest.project.as_deref(), Some("ci"));
    }
}

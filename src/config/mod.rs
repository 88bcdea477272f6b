//! Manifest loading, parsing, and validation.
//!
//! This module handles all aspects of the project manifest:
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Local override merging in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use depprobe::config::{load_manifest, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("depprobe.yml"), "project: demo").unwrap();
//!
//! let loaded = load_manifest(temp.path(), None).unwrap();
//! validate(&loaded.manifest).unwrap();
//! assert_eq!(loaded.manifest.project, Some("demo".to_string()));
//! ```
//!
//! # Manifest Locations
//!
//! 1. `--config FILE` (loaded alone, must exist)
//! 2. Project manifest (`depprobe.yml`)
//! 3. Local overrides (`depprobe.local.yml`)
//!
//! Without either file the built-in default manifest is used.

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use schema::{CapabilityEntry, CustomProbeConfig, FeatureConfig, ProbeManifest};

pub use loader::{
    find_project_root, load_manifest, load_manifest_file, load_manifest_value, parse_manifest,
    LoadedManifest, ManifestPaths, LOCAL_MANIFEST_FILE, MANIFEST_FILE,
};

pub use merger::{deep_merge, merge_manifests};

pub use validator::{validate, validate_manifest, ValidationError};

/// JSON Schema for `depprobe.yml`.
pub fn manifest_schema() -> schemars::Schema {
    schemars::schema_for!(ProbeManifest)
}

//! State shared by every command of one invocation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::args::{Cli, WithPath};
use crate::config::{load_manifest, validate, LoadedManifest};
use crate::error::Result;
use crate::probe::{Capability, DefinitionRegistry};
use crate::toolchain::PlatformPair;

/// Global flags resolved for one run.
#[derive(Debug, Clone)]
pub struct ProbeContext {
    project_root: PathBuf,
    config: Option<PathBuf>,
    build: Option<String>,
    host: Option<String>,
    with_paths: Vec<WithPath>,
}

impl ProbeContext {
    /// Context with no overrides.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            config: None,
            build: None,
            host: None,
            with_paths: Vec::new(),
        }
    }

    /// Take the global flags from parsed arguments.
    pub fn from_cli(project_root: impl Into<PathBuf>, cli: &Cli) -> Self {
        Self {
            project_root: project_root.into(),
            config: cli.config.clone(),
            build: cli.build.clone(),
            host: cli.host.clone(),
            with_paths: cli.with.clone(),
        }
    }

    pub fn with_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = Some(path.into());
        self
    }

    pub fn with_host(mut self, triple: impl Into<String>) -> Self {
        self.host = Some(triple.into());
        self
    }

    pub fn with_path(mut self, capability: Capability, path: impl Into<PathBuf>) -> Self {
        self.with_paths.push(WithPath {
            capability,
            path: path.into(),
        });
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Load and validate the manifest.
    pub fn manifest(&self) -> Result<LoadedManifest> {
        let loaded = load_manifest(&self.project_root, self.config.as_deref())?;
        validate(&loaded.manifest)?;
        for source in &loaded.sources {
            debug!("Manifest layer: {}", source.display());
        }
        Ok(loaded)
    }

    /// Build and host platforms from `--build` / `--host`.
    pub fn platforms(&self) -> Result<PlatformPair> {
        PlatformPair::from_flags(self.build.as_deref(), self.host.as_deref())
    }

    /// `--with` paths by capability. Later flags win.
    pub fn with_paths(&self) -> BTreeMap<Capability, PathBuf> {
        self.with_paths
            .iter()
            .map(|w| (w.capability.clone(), w.path.clone()))
            .collect()
    }

    /// Definitions for `host`, including the manifest's custom probes.
    pub fn registry(
        &self,
        loaded: &LoadedManifest,
        platforms: &PlatformPair,
    ) -> Result<DefinitionRegistry> {
        DefinitionRegistry::with_custom(&platforms.host, &loaded.manifest.custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn later_with_path_wins() {
        let ctx = ProbeContext::new("/project")
            .with_path(Capability::OpenSsl, "/a")
            .with_path(Capability::OpenSsl, "/b");
        assert_eq!(ctx.with_paths()[&Capability::OpenSsl], PathBuf::from("/b"));
    }

    #[test]
    fn host_flag_sets_platform() {
        let ctx = ProbeContext::new("/project").with_host("aarch64-apple-darwin");
        assert!(ctx.platforms().unwrap().host.is_macos());
    }

    #[test]
    fn invalid_manifest_is_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("depprobe.yml"),
            "capabilities:\n  libnothing: {}\n",
        )
        .unwrap();
        let ctx = ProbeContext::new(temp.path());
        let err = ctx.manifest().unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn registry_includes_custom_probes() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("depprobe.yml"),
            r#"
custom:
  - name: zlib
    version_file: include/zlib.h
    version_pattern: 'ZLIB_VERSION "([0-9.]+)"'
    fragment: "int main() { return 0; }"
"#,
        )
        .unwrap();
        let ctx = ProbeContext::new(temp.path()).with_host("x86_64-linux-gnu");
        let loaded = ctx.manifest().unwrap();
        let registry = ctx.registry(&loaded, &ctx.platforms().unwrap()).unwrap();
        assert!(registry.contains(&Capability::Custom("zlib".into())));
        assert!(registry.contains(&Capability::OpenSsl));
    }
}

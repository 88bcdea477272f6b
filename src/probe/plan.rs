//! What a run should probe, and in which order.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::ProbeManifest;
use crate::error::{ProbeError, Result};
use crate::probe::capability::Capability;
use crate::probe::definition::DefinitionRegistry;
use crate::probe::features::{builtin_features, FeatureCheck};
use crate::probe::version::Version;
use crate::toolchain::Platform;

/// A request to probe one capability, with per-run overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub capability: Capability,
    /// User-supplied root (`--with-<name>=PATH`).
    pub explicit_root: Option<PathBuf>,
    /// Overrides the definition's default when set.
    pub mandatory: Option<bool>,
    /// Overrides the definition's minimum version when set.
    pub min_version: Option<Version>,
}

impl ProbeRequest {
    /// A request with no overrides.
    pub fn new(capability: Capability) -> Self {
        Self {
            capability,
            explicit_root: None,
            mandatory: None,
            min_version: None,
        }
    }
}

/// Ordered list of checks for one run.
#[derive(Debug, Clone, Default)]
pub struct ProbePlan {
    pub features: Vec<FeatureCheck>,
    pub requests: Vec<ProbeRequest>,
}

impl ProbePlan {
    /// The plan used when no manifest lists capabilities: every built-in
    /// capability with its default mandatory flag, plus built-in features.
    pub fn default_plan() -> Self {
        Self {
            features: builtin_features(),
            requests: Capability::BUILTIN
                .iter()
                .cloned()
                .map(ProbeRequest::new)
                .collect(),
        }
    }

    /// Build the plan from a manifest.
    ///
    /// Capabilities are probed in manifest order, followed by custom probes
    /// not mentioned there. `with_paths` are applied last and must name a
    /// capability the plan or registry knows.
    pub fn from_manifest(
        manifest: &ProbeManifest,
        registry: &DefinitionRegistry,
        with_paths: &BTreeMap<Capability, PathBuf>,
        host: &Platform,
    ) -> Result<Self> {
        let mut plan = if manifest.capabilities.is_empty() {
            let mut plan = Self::default_plan();
            plan.features.clear();
            plan
        } else {
            let mut requests = Vec::new();
            for entry in &manifest.capabilities {
                let capability: Capability = entry.name.parse()?;
                if capability != Capability::OsxFrameworks && !registry.contains(&capability) {
                    return Err(ProbeError::UnknownCapability(entry.name.clone()));
                }
                requests.push(ProbeRequest {
                    capability,
                    explicit_root: entry.path.clone(),
                    mandatory: entry.mandatory,
                    min_version: entry.min_version,
                });
            }
            Self {
                features: Vec::new(),
                requests,
            }
        };

        for custom in &manifest.custom {
            let capability = Capability::Custom(custom.name.to_ascii_lowercase());
            if !plan.contains(&capability) {
                plan.requests.push(ProbeRequest::new(capability));
            }
        }

        if manifest.builtin_features {
            plan.features.extend(builtin_features());
        }
        plan.features
            .extend(manifest.features.iter().map(FeatureCheck::from));
        plan.features.retain(|f| f.applies_to(host));

        plan.apply_with_paths(with_paths)?;
        Ok(plan)
    }

    /// Apply `--with-<name>=PATH` overrides.
    pub fn apply_with_paths(&mut self, with_paths: &BTreeMap<Capability, PathBuf>) -> Result<()> {
        for (capability, path) in with_paths {
            let request = self
                .requests
                .iter_mut()
                .find(|r| &r.capability == capability)
                .ok_or_else(|| ProbeError::UnknownCapability(capability.name().to_string()))?;
            request.explicit_root = Some(path.clone());
        }
        Ok(())
    }

    /// Whether the plan probes `capability`.
    pub fn contains(&self, capability: &Capability) -> bool {
        self.requests.iter().any(|r| &r.capability == capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CapabilityEntry, FeatureConfig};

    fn linux() -> Platform {
        "x86_64-linux-gnu".parse().unwrap()
    }

    #[test]
    fn default_plan_probes_every_builtin() {
        let plan = ProbePlan::default_plan();
        assert_eq!(plan.requests.len(), Capability::BUILTIN.len());
        assert!(!plan.features.is_empty());
    }

    #[test]
    fn manifest_order_is_preserved() {
        let mut manifest = ProbeManifest::default();
        manifest.capabilities.push(CapabilityEntry::named("sqlite3"));
        manifest.capabilities.push(CapabilityEntry {
            name: "openssl".into(),
            mandatory: Some(false),
            min_version: Some(Version::new(1, 1, 0)),
            path: None,
        });

        let registry = DefinitionRegistry::new(&linux());
        let plan =
            ProbePlan::from_manifest(&manifest, &registry, &BTreeMap::new(), &linux()).unwrap();

        let order: Vec<&str> = plan.requests.iter().map(|r| r.capability.name()).collect();
        assert_eq!(order, vec!["sqlite3", "openssl"]);
        assert_eq!(plan.requests[1].mandatory, Some(false));
        assert_eq!(plan.requests[1].min_version, Some(Version::new(1, 1, 0)));
    }

    #[test]
    fn unknown_manifest_capability_is_rejected() {
        let mut manifest = ProbeManifest::default();
        manifest
            .capabilities
            .push(CapabilityEntry::named("libnothing"));
        let registry = DefinitionRegistry::new(&linux());
        let err = ProbePlan::from_manifest(&manifest, &registry, &BTreeMap::new(), &linux())
            .unwrap_err();
        assert!(matches!(err, ProbeError::UnknownCapability(_)));
    }

    #[test]
    fn with_paths_set_explicit_roots() {
        let manifest = ProbeManifest::default();
        let registry = DefinitionRegistry::new(&linux());
        let mut with = BTreeMap::new();
        with.insert(Capability::OpenSsl, PathBuf::from("/opt/ssl"));

        let plan = ProbePlan::from_manifest(&manifest, &registry, &with, &linux()).unwrap();
        let openssl = plan
            .requests
            .iter()
            .find(|r| r.capability == Capability::OpenSsl)
            .unwrap();
        assert_eq!(openssl.explicit_root, Some(PathBuf::from("/opt/ssl")));
    }

    #[test]
    fn with_path_for_unplanned_capability_fails() {
        let mut plan = ProbePlan::default();
        let mut with = BTreeMap::new();
        with.insert(Capability::Sqlite3, PathBuf::from("/opt/sqlite"));
        assert!(plan.apply_with_paths(&with).is_err());
    }

    #[test]
    fn features_are_filtered_by_host() {
        let manifest = ProbeManifest {
            builtin_features: true,
            features: vec![FeatureConfig {
                define: "HAVE_CUSTOM".into(),
                description: None,
                fragment: "int main() { return 0; }".into(),
                flags: vec![],
            }],
            ..Default::default()
        };
        let registry = DefinitionRegistry::new(&linux());
        let mac: Platform = "x86_64-apple-darwin".parse().unwrap();

        let plan = ProbePlan::from_manifest(&manifest, &registry, &BTreeMap::new(), &mac).unwrap();
        assert!(plan.features.iter().any(|f| f.define == "HAVE_CUSTOM"));
        assert!(!plan.features.iter().any(|f| f.define == "HAVE_NETLINK"));
    }
}

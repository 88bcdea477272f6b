//! The configuration environment built up by a probing run.
//!
//! One [`ConfigEnvironment`] exists per run. Probes add capabilities and
//! defines to it in order; output writers read it at the end.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::probe::capability::{Capability, CapabilityRecord};
use crate::toolchain::PlatformPair;

/// Detected capabilities and preprocessor defines for one run.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigEnvironment {
    platforms: PlatformPair,
    compiler: Option<String>,
    capabilities: BTreeMap<Capability, CapabilityRecord>,
    defines: BTreeMap<String, String>,
}

impl ConfigEnvironment {
    /// Create an empty environment for `platforms`.
    pub fn new(platforms: PlatformPair) -> Self {
        Self {
            platforms,
            compiler: None,
            capabilities: BTreeMap::new(),
            defines: BTreeMap::new(),
        }
    }

    pub fn platforms(&self) -> &PlatformPair {
        &self.platforms
    }

    /// Record the compiler that passed the toolchain check.
    pub fn set_compiler(&mut self, compiler: impl Into<String>) {
        self.compiler = Some(compiler.into());
    }

    pub fn compiler(&self) -> Option<&str> {
        self.compiler.as_deref()
    }

    /// Register a capability together with its defines.
    ///
    /// Sets `record.define` to `1` and, when a version is known,
    /// `<NAME>_PROBED_VERSION` to the quoted version string.
    pub fn register(&mut self, capability: Capability, record: CapabilityRecord) {
        debug!("Registering {} as {}", capability, record.define);
        self.defines.insert(record.define.clone(), "1".to_string());
        if let Some(version) = &record.version {
            self.defines.insert(
                version_define_name(&record.define),
                format!("\"{}\"", version),
            );
        }
        self.capabilities.insert(capability, record);
    }

    /// Set a preprocessor define. `value` is the literal replacement text.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.defines.insert(name.into(), value.into());
    }

    /// Whether a capability was registered.
    pub fn is_registered(&self, capability: &Capability) -> bool {
        self.capabilities.contains_key(capability)
    }

    /// Look up a registered capability.
    pub fn get(&self, capability: &Capability) -> Option<&CapabilityRecord> {
        self.capabilities.get(capability)
    }

    /// All registered capabilities, built-ins first.
    pub fn capabilities(&self) -> impl Iterator<Item = (&Capability, &CapabilityRecord)> {
        self.capabilities.iter()
    }

    /// All defines in name order.
    pub fn defines(&self) -> &BTreeMap<String, String> {
        &self.defines
    }

    /// Whether a define is set.
    pub fn is_defined(&self, name: &str) -> bool {
        self.defines.contains_key(name)
    }
}

/// `HAVE_OPENSSL` becomes `OPENSSL_PROBED_VERSION`.
fn version_define_name(define: &str) -> String {
    let stem = define.strip_prefix("HAVE_").unwrap_or(define);
    format!("{}_PROBED_VERSION", stem)
}

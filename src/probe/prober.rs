//! The probe pipeline.
//!
//! For each capability the [`Prober`] resolves an installation root, reads
//! and parses the version header, enforces the minimum version, compiles a
//! test fragment against the candidate paths and finally registers the
//! result in the [`ConfigEnvironment`]. Probes run strictly in order; the
//! first mandatory failure stops the run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ProbeError, Result};
use crate::probe::capability::{Capability, CapabilityRecord};
use crate::probe::definition::{DefinitionRegistry, ProbeDefinition};
use crate::probe::environment::ConfigEnvironment;
use crate::probe::features::FeatureCheck;
use crate::probe::frameworks::{frameworks_job, frameworks_record};
use crate::probe::plan::{ProbePlan, ProbeRequest};
use crate::probe::root::resolve_root;
use crate::probe::version::{compile_pattern, parse_version_text, Version};
use crate::toolchain::{CompileJob, FragmentCompiler, PlatformPair};

/// Maximum number of compiler output lines kept in a link error.
const MAX_OUTPUT_LINES: usize = 20;

/// What happened to one probe.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The capability was found and registered.
    Registered(CapabilityRecord),
    /// An optional capability failed and was left unregistered.
    Absent { reason: ProbeError },
    /// The probe does not apply to this host.
    Skipped { reason: String },
}

impl ProbeOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, ProbeOutcome::Registered(_))
    }
}

/// Progress notifications emitted by [`Prober::run_plan`].
#[derive(Debug)]
pub enum ProbeEvent<'a> {
    /// A check is about to run.
    Started { label: &'a str },
    /// The toolchain check passed.
    CompilerReady { label: &'a str, compiler: &'a str },
    /// A compiler-feature check finished.
    Feature {
        label: &'a str,
        define: &'a str,
        supported: bool,
    },
    /// A capability probe finished without a fatal error.
    Finished {
        label: &'a str,
        outcome: &'a ProbeOutcome,
    },
    /// A check failed fatally; the run stops.
    Failed {
        label: &'a str,
        error: &'a ProbeError,
    },
}

/// Runs probes against a compiler and collects the results.
pub struct Prober<'a> {
    registry: &'a DefinitionRegistry,
    compiler: &'a dyn FragmentCompiler,
    env: ConfigEnvironment,
}

impl<'a> Prober<'a> {
    /// Create a prober with an empty environment.
    pub fn new(
        registry: &'a DefinitionRegistry,
        compiler: &'a dyn FragmentCompiler,
        platforms: PlatformPair,
    ) -> Self {
        Self {
            registry,
            compiler,
            env: ConfigEnvironment::new(platforms),
        }
    }

    /// The environment built so far.
    pub fn environment(&self) -> &ConfigEnvironment {
        &self.env
    }

    /// Consume the prober, returning the environment.
    pub fn into_environment(self) -> ConfigEnvironment {
        self.env
    }

    /// Probe one definition without registering anything.
    ///
    /// `explicit` is a user-supplied root; `min_version` and `mandatory`
    /// come from the definition.
    pub fn probe_definition(
        &self,
        def: &ProbeDefinition,
        explicit: Option<&Path>,
    ) -> Result<CapabilityRecord> {
        let name = def.capability.name().to_string();

        let root = resolve_root(
            &def.capability,
            explicit,
            &def.search_paths,
            &def.version_files(),
        )?;
        debug!("{}: root is {}", name, root.display());

        let version = read_version(&name, def, &root)?;

        if let Some(minimum) = &def.min_version {
            if !version.at_least(minimum) {
                return Err(ProbeError::VersionTooOld {
                    capability: name,
                    found: version.to_string(),
                    required: minimum.to_string(),
                });
            }
        }

        let include_dir = def.include_dir(&root);
        let library_dir = def.library_dir(&root);
        let mut job = CompileJob::new(def.fragment.clone());
        job.include_dirs.push(include_dir.clone());
        job.library_dirs.push(library_dir.clone());
        job.libraries = def.libraries.clone();

        let extra_flags = self.compile_with_fallback(&name, job, &def.alternate_flags)?;

        Ok(CapabilityRecord {
            include_path: Some(include_dir),
            library_names: def.libraries.clone(),
            library_path: Some(library_dir),
            version: Some(version),
            extra_flags,
            define: def.capability.define_name(),
            defined: true,
        })
    }

    /// Compile `job`, retrying once with `alternate` appended.
    ///
    /// Returns the extra flags that were needed.
    fn compile_with_fallback(
        &self,
        name: &str,
        mut job: CompileJob,
        alternate: &[String],
    ) -> Result<Vec<String>> {
        let first = self.compiler.compile(&job)?;
        if first.success {
            return Ok(Vec::new());
        }

        if alternate.is_empty() {
            return Err(link_failed(name, &first.output));
        }

        debug!(
            "{}: first attempt failed, retrying with {}",
            name,
            alternate.join(" ")
        );
        job.extra_flags.extend(alternate.iter().cloned());
        let second = self.compiler.compile(&job)?;
        if second.success {
            Ok(alternate.to_vec())
        } else {
            Err(link_failed(name, &second.output))
        }
    }

    /// Probe a requested capability and register it on success.
    ///
    /// Mandatory failures are returned as errors. Optional failures are
    /// reported as [`ProbeOutcome::Absent`] and leave the environment
    /// untouched.
    pub fn probe(&mut self, request: &ProbeRequest) -> Result<ProbeOutcome> {
        if request.capability == Capability::OsxFrameworks {
            return self.probe_frameworks(request.mandatory.unwrap_or(false));
        }

        let def = self
            .registry
            .get(&request.capability)
            .ok_or_else(|| ProbeError::UnknownCapability(request.capability.name().to_string()))?;

        let mut def = def.clone();
        if let Some(mandatory) = request.mandatory {
            def.mandatory = mandatory;
        }
        if request.min_version.is_some() {
            def.min_version = request.min_version;
        }

        match self.probe_definition(&def, request.explicit_root.as_deref()) {
            Ok(record) => {
                debug!(
                    "Found {} {}",
                    def.capability.display_name(),
                    record
                        .version
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                );
                self.env.register(def.capability.clone(), record.clone());
                Ok(ProbeOutcome::Registered(record))
            }
            Err(err) if def.mandatory || err.capability().is_none() => Err(err),
            Err(err) => {
                warn!("Optional {} unavailable: {}", def.capability, err);
                Ok(ProbeOutcome::Absent { reason: err })
            }
        }
    }

    /// Probe the macOS frameworks. Skipped on other hosts.
    pub fn probe_frameworks(&mut self, mandatory: bool) -> Result<ProbeOutcome> {
        if !self.env.platforms().host.is_macos() {
            return Ok(ProbeOutcome::Skipped {
                reason: "host is not macOS".to_string(),
            });
        }

        let outcome = self.compiler.compile(&frameworks_job())?;
        if outcome.success {
            let record = frameworks_record();
            self.env
                .register(Capability::OsxFrameworks, record.clone());
            return Ok(ProbeOutcome::Registered(record));
        }

        let err = link_failed(Capability::OsxFrameworks.name(), &outcome.output);
        if mandatory {
            Err(err)
        } else {
            warn!("Optional {} unavailable: {}", Capability::OsxFrameworks, err);
            Ok(ProbeOutcome::Absent { reason: err })
        }
    }

    /// Run one compiler-feature check. Defines the macro on success.
    pub fn check_feature(&mut self, feature: &FeatureCheck) -> Result<bool> {
        let outcome = self.compiler.compile(&feature.job())?;
        if outcome.success {
            self.env.define(feature.define.clone(), "1");
        } else {
            debug!("{} not supported", feature.define);
        }
        Ok(outcome.success)
    }

    /// Run a whole plan: toolchain check, feature checks, then capabilities.
    ///
    /// `observer` receives progress events. The first fatal error is
    /// reported to the observer and returned.
    pub fn run_plan(
        &mut self,
        plan: &ProbePlan,
        observer: &mut dyn FnMut(ProbeEvent<'_>),
    ) -> Result<()> {
        let label = "C++ compiler";
        observer(ProbeEvent::Started { label });
        if let Err(error) = self.compiler.check() {
            observer(ProbeEvent::Failed {
                label,
                error: &error,
            });
            return Err(error);
        }
        let compiler = self.compiler.describe();
        self.env.set_compiler(compiler.clone());
        observer(ProbeEvent::CompilerReady {
            label,
            compiler: &compiler,
        });

        for feature in &plan.features {
            let label = feature.description.as_str();
            observer(ProbeEvent::Started { label });
            let supported = self.check_feature(feature)?;
            observer(ProbeEvent::Feature {
                label,
                define: &feature.define,
                supported,
            });
        }

        for request in &plan.requests {
            let label = request.capability.name();
            observer(ProbeEvent::Started { label });
            match self.probe(request) {
                Ok(outcome) => observer(ProbeEvent::Finished {
                    label,
                    outcome: &outcome,
                }),
                Err(error) => {
                    observer(ProbeEvent::Failed {
                        label,
                        error: &error,
                    });
                    return Err(error);
                }
            }
        }

        Ok(())
    }
}

/// Read the version from the first source under `root` that yields one.
///
/// Sources whose header is missing are skipped. When every present header
/// fails to match, the first of them is named in the error.
fn read_version(name: &str, def: &ProbeDefinition, root: &Path) -> Result<Version> {
    let mut unmatched: Option<PathBuf> = None;

    for source in &def.version_sources {
        let path = root.join(&source.file);
        if !path.is_file() {
            continue;
        }
        let bytes = fs::read(&path)?;
        let text = String::from_utf8_lossy(&bytes);
        let pattern = compile_pattern(&source.pattern)?;
        if let Some(version) = parse_version_text(&text, &pattern, source.encoding) {
            debug!("{}: version {} from {}", name, version, path.display());
            return Ok(version);
        }
        unmatched.get_or_insert(path);
    }

    Err(ProbeError::UnparsableVersion {
        capability: name.to_string(),
        file: unmatched.unwrap_or_else(|| root.to_path_buf()),
    })
}

fn link_failed(name: &str, output: &str) -> ProbeError {
    let lines: Vec<&str> = output.trim().lines().take(MAX_OUTPUT_LINES).collect();
    ProbeError::LinkFailed {
        capability: name.to_string(),
        output: if lines.is_empty() {
            "compiler exited with an error".to_string()
        } else {
            lines.join("\n")
        },
    }
}

//! Probe command implementation.
//!
//! The `depprobe probe <name>` command checks a single capability.

use crate::cli::args::ProbeArgs;
use crate::cli::context::ProbeContext;
use crate::config::ProbeManifest;
use crate::error::{ProbeError, Result};
use crate::output::{render, write_output};
use crate::probe::{Capability, ProbeEvent, ProbeOutcome, ProbePlan, ProbeRequest, Prober};
use crate::toolchain::{FragmentCompiler, Toolchain};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::progress::ProgressReporter;

/// The probe command implementation.
pub struct ProbeCommand {
    context: ProbeContext,
    args: ProbeArgs,
    compiler: Option<Box<dyn FragmentCompiler>>,
}

impl ProbeCommand {
    /// Create a new probe command.
    pub fn new(context: ProbeContext, args: ProbeArgs) -> Self {
        Self {
            context,
            args,
            compiler: None,
        }
    }

    /// Use `compiler` instead of detecting the system toolchain.
    pub fn with_compiler(mut self, compiler: Box<dyn FragmentCompiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// The request for this run. Flags beat `--with`, which beats the
    /// manifest. Only `--mandatory` makes a miss fatal.
    fn request(&self, capability: Capability, manifest: &ProbeManifest) -> ProbeRequest {
        let mut request = ProbeRequest::new(capability.clone());

        if let Some(entry) = manifest
            .capabilities
            .iter()
            .find(|e| e.name.parse::<Capability>().ok().as_ref() == Some(&capability))
        {
            request.explicit_root = entry.path.clone();
            request.min_version = entry.min_version;
        }

        if let Some(path) = self.context.with_paths().remove(&capability) {
            request.explicit_root = Some(path);
        }
        if let Some(path) = &self.args.path {
            request.explicit_root = Some(path.clone());
        }
        if self.args.min_version.is_some() {
            request.min_version = self.args.min_version;
        }
        request.mandatory = Some(self.args.mandatory);

        request
    }
}

impl Command for ProbeCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let capability: Capability = self.args.name.parse()?;
        let loaded = self.context.manifest()?;
        let platforms = self.context.platforms()?;
        let registry = self.context.registry(&loaded, &platforms)?;

        if capability != Capability::OsxFrameworks && !registry.contains(&capability) {
            return Err(ProbeError::UnknownCapability(self.args.name.clone()));
        }

        let plan = ProbePlan {
            features: Vec::new(),
            requests: vec![self.request(capability, &loaded.manifest)],
        };

        let detected;
        let compiler: &dyn FragmentCompiler = match &self.compiler {
            Some(compiler) => compiler.as_ref(),
            None => {
                detected = Toolchain::detect(&platforms)?;
                &detected
            }
        };

        let mut prober = Prober::new(&registry, compiler, platforms);
        let mut missing = None;
        let run = {
            let mut reporter = ProgressReporter::new(ui);
            let run = prober.run_plan(&plan, &mut |event| {
                if let ProbeEvent::Finished { outcome, .. } = &event {
                    missing = match outcome {
                        ProbeOutcome::Registered(_) => None,
                        ProbeOutcome::Absent { reason } => Some(reason.to_string()),
                        ProbeOutcome::Skipped { reason } => Some(reason.clone()),
                    };
                }
                reporter.handle(event);
            });
            run
        };
        run?;

        if let Some(reason) = missing {
            ui.warning(&reason);
            return Ok(CommandResult::failure(1));
        }

        let env = prober.into_environment();
        let rendered = render(&env, self.args.format, loaded.manifest.project.as_deref())?;
        write_output(&rendered, None)?;
        Ok(CommandResult::success())
    }
}

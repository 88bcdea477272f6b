//! Configure command implementation.
//!
//! The `depprobe configure` command probes every planned capability and
//! compiler feature and renders the resulting environment.

use tracing::debug;

use crate::cli::args::ConfigureArgs;
use crate::cli::context::ProbeContext;
use crate::error::Result;
use crate::output::{render, write_output};
use crate::probe::{ProbePlan, Prober};
use crate::toolchain::{FragmentCompiler, Toolchain};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::progress::ProgressReporter;

/// The configure command implementation.
pub struct ConfigureCommand {
    context: ProbeContext,
    args: ConfigureArgs,
    compiler: Option<Box<dyn FragmentCompiler>>,
}

impl ConfigureCommand {
    /// Create a new configure command.
    pub fn new(context: ProbeContext, args: ConfigureArgs) -> Self {
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

    /// Get the command arguments.
    pub fn args(&self) -> &ConfigureArgs {
        &self.args
    }
}

impl Command for ConfigureCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let loaded = self.context.manifest()?;
        if loaded.is_default() {
            debug!("No manifest found; probing built-in capabilities");
        }
        let platforms = self.context.platforms()?;
        let registry = self.context.registry(&loaded, &platforms)?;

        let mut plan = ProbePlan::from_manifest(
            &loaded.manifest,
            &registry,
            &self.context.with_paths(),
            &platforms.host,
        )?;
        if self.args.skip_features {
            plan.features.clear();
        }

        let project = loaded.manifest.project.as_deref();
        ui.show_header(&format!("depprobe: {}", project.unwrap_or("configure")));
        if platforms.is_cross() {
            ui.message(&format!(
                "Cross compiling from {} to {}",
                platforms.build, platforms.host
            ));
        }

        let detected;
        let compiler: &dyn FragmentCompiler = match &self.compiler {
            Some(compiler) => compiler.as_ref(),
            None => match Toolchain::detect(&platforms) {
                Ok(toolchain) => {
                    detected = toolchain;
                    &detected
                }
                Err(e) => {
                    let mut spinner = ui.start_spinner("Checking for 'C++ compiler'");
                    spinner.finish_error(e.short_reason());
                    return Err(e);
                }
            },
        };

        let mut prober = Prober::new(&registry, compiler, platforms);
        let (run, found, absent) = {
            let mut reporter = ProgressReporter::new(ui);
            let run = prober.run_plan(&plan, &mut |event| reporter.handle(event));
            (run, reporter.found(), reporter.absent())
        };
        run?;

        let env = prober.into_environment();
        let rendered = render(&env, self.args.format, project)?;
        write_output(&rendered, self.args.output.as_deref())?;

        if let Some(path) = &self.args.output {
            ui.success(&format!("Wrote {}", path.display()));
        }
        if absent > 0 {
            ui.success(&format!(
                "Configured {} capabilities ({} optional not found)",
                found, absent
            ));
        } else {
            ui.success(&format!("Configured {} capabilities", found));
        }

        Ok(CommandResult::success())
    }
}

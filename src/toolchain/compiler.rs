//! C++ compiler discovery and fragment compilation.
//!
//! Every probe ends by compiling and linking a tiny program against the
//! candidate include and library paths. [`FragmentCompiler`] is the seam
//! for that; [`Toolchain`] is the real implementation that shells out to
//! the system compiler.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{ProbeError, Result};
use crate::toolchain::platform::PlatformPair;

/// Compilers tried, in order, when `CXX` is not set.
const DEFAULT_COMPILERS: &[&str] = &["c++", "g++", "clang++"];

/// Program used by the toolchain sanity check.
const EMPTY_PROGRAM: &str = "int main() { return 0; }\n";

/// One compile-and-link attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileJob {
    /// C++ source of the fragment.
    pub source: String,
    /// Header search paths (`-I`).
    pub include_dirs: Vec<PathBuf>,
    /// Library search paths (`-L`).
    pub library_dirs: Vec<PathBuf>,
    /// Libraries to link (`-l`).
    pub libraries: Vec<String>,
    /// macOS frameworks to link (`-framework`).
    pub frameworks: Vec<String>,
    /// Additional flags appended after the libraries.
    pub extra_flags: Vec<String>,
}

impl CompileJob {
    /// A job with only source text.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    /// Compiler and linker arguments for this job, excluding the source and
    /// output file.
    pub fn flags(&self) -> (Vec<String>, Vec<String>) {
        let compile = self
            .include_dirs
            .iter()
            .map(|d| format!("-I{}", d.display()))
            .collect();

        let mut link: Vec<String> = self
            .library_dirs
            .iter()
            .map(|d| format!("-L{}", d.display()))
            .collect();
        link.extend(self.libraries.iter().map(|l| format!("-l{}", l)));
        for framework in &self.frameworks {
            link.push("-framework".to_string());
            link.push(framework.clone());
        }
        link.extend(self.extra_flags.iter().cloned());

        (compile, link)
    }
}

/// Result of a compile-and-link attempt.
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    /// Whether the compiler exited with status 0.
    pub success: bool,
    /// Combined stdout and stderr of the compiler.
    pub output: String,
    /// The command line that was run, for diagnostics.
    pub command: String,
}

/// Something that can compile and link a C++ fragment.
pub trait FragmentCompiler {
    /// Compile and link `job`. `Ok` with `success == false` means the
    /// compiler ran and rejected the fragment; `Err` means it could not run.
    fn compile(&self, job: &CompileJob) -> Result<CompileOutcome>;

    /// Short description for logs, e.g. the compiler path.
    fn describe(&self) -> String;

    /// Verify the compiler can build an empty program.
    fn check(&self) -> Result<()> {
        let outcome = self.compile(&CompileJob::new(EMPTY_PROGRAM))?;
        if outcome.success {
            Ok(())
        } else {
            Err(ProbeError::CompilerNotFound {
                tried: vec![format!("{} ({})", self.describe(), outcome.output.trim())],
            })
        }
    }
}

/// The system C++ toolchain.
#[derive(Debug, Clone)]
pub struct Toolchain {
    program: PathBuf,
    leading_args: Vec<String>,
    cxxflags: Vec<String>,
    ldflags: Vec<String>,
}

impl Toolchain {
    /// Detect the compiler from the process environment and `PATH`.
    pub fn detect(platforms: &PlatformPair) -> Result<Self> {
        Self::detect_with_env(platforms, |key: &str| std::env::var(key), &parse_system_path())
    }

    /// Detect the compiler with a custom env lookup and search path.
    ///
    /// Resolution order: `CXX` (first word is the program, the rest are
    /// leading arguments), then `<host-triple>-c++` when cross compiling,
    /// then `c++`, `g++`, `clang++`.
    pub fn detect_with_env<F>(
        platforms: &PlatformPair,
        env_fn: F,
        path_entries: &[PathBuf],
    ) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
    {
        let cxxflags = split_flags(env_fn("CXXFLAGS").ok().as_deref());
        let ldflags = split_flags(env_fn("LDFLAGS").ok().as_deref());

        let mut tried = Vec::new();

        if let Ok(cxx) = env_fn("CXX") {
            let mut words = cxx.split_whitespace();
            if let Some(first) = words.next() {
                tried.push(first.to_string());
                if let Some(program) = locate(first, path_entries) {
                    debug!("Using compiler from CXX: {}", program.display());
                    return Ok(Self {
                        program,
                        leading_args: words.map(String::from).collect(),
                        cxxflags,
                        ldflags,
                    });
                }
                warn!(
                    "CXX is set to '{}' but it was not found; trying default compilers",
                    first
                );
            }
        }

        let host = platforms.host.triple();
        let cross: Vec<String> = if platforms.is_cross() {
            vec![format!("{}-c++", host), format!("{}-g++", host)]
        } else {
            Vec::new()
        };

        for candidate in cross {
            if let Some(program) = locate(&candidate, path_entries) {
                debug!("Using cross compiler {}", program.display());
                return Ok(Self {
                    program,
                    leading_args: Vec::new(),
                    cxxflags,
                    ldflags,
                });
            }
            tried.push(candidate);
        }
        if platforms.is_cross() {
            warn!(
                "No {host}-c++ or {host}-g++ found; probing {host} with the native compiler",
                host = host
            );
        }

        for candidate in DEFAULT_COMPILERS {
            if let Some(program) = locate(candidate, path_entries) {
                debug!("Using compiler {}", program.display());
                return Ok(Self {
                    program,
                    leading_args: Vec::new(),
                    cxxflags,
                    ldflags,
                });
            }
            tried.push(candidate.to_string());
        }

        Err(ProbeError::CompilerNotFound { tried })
    }

    /// Path of the compiler executable.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full argument list for compiling `source` into `output`.
    pub fn arguments(&self, job: &CompileJob, source: &Path, output: &Path) -> Vec<String> {
        let (compile_flags, link_flags) = job.flags();
        let mut args = self.leading_args.clone();
        args.extend(self.cxxflags.iter().cloned());
        args.extend(compile_flags);
        args.push(source.display().to_string());
        args.push("-o".to_string());
        args.push(output.display().to_string());
        args.extend(link_flags);
        args.extend(self.ldflags.iter().cloned());
        args
    }
}

impl FragmentCompiler for Toolchain {
    fn compile(&self, job: &CompileJob) -> Result<CompileOutcome> {
        let scratch = tempfile::Builder::new().prefix("depprobe").tempdir()?;
        let source = scratch.path().join("fragment.cpp");
        let output = scratch.path().join(if cfg!(windows) {
            "fragment.exe"
        } else {
            "fragment"
        });
        fs::write(&source, &job.source)?;

        let args = self.arguments(job, &source, &output);
        let command = format!("{} {}", self.program.display(), args.join(" "));
        debug!("Running: {}", command);

        let result = Command::new(&self.program).args(&args).output()?;

        let mut text = String::from_utf8_lossy(&result.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&result.stderr));

        debug!("Compiler exited with {:?}", result.status.code());

        Ok(CompileOutcome {
            success: result.status.success(),
            output: text,
            command,
        })
    }

    fn describe(&self) -> String {
        self.program.display().to_string()
    }
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    for dir in path_entries {
        let candidate = dir.join(tool);
        if candidate.is_file() && is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Resolve a program given either as a path or as a bare name.
fn locate(program: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    let as_path = Path::new(program);
    if as_path.components().count() > 1 {
        return (as_path.is_file() && is_executable(as_path)).then(|| as_path.to_path_buf());
    }
    resolve_tool_path(program, path_entries)
}

fn split_flags(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| v.split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}

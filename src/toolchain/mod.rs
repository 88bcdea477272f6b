//! Platform detection and the C++ compiler used by probes.

pub mod compiler;
pub mod platform;

pub use compiler::{
    is_executable, parse_system_path, resolve_tool_path, CompileJob, CompileOutcome,
    FragmentCompiler, Toolchain,
};
pub use platform::{Platform, PlatformPair, TargetOs};

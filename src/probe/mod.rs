//! Capability and compiler-feature probing.
//!
//! A run builds a [`ProbePlan`] from the manifest, then a [`Prober`] walks
//! it against a [`FragmentCompiler`](crate::toolchain::FragmentCompiler),
//! filling a [`ConfigEnvironment`].
//!
//! ```
//! use depprobe::probe::{Capability, Version, VersionEncoding};
//!
//! let cap: Capability = "sqlite".parse().unwrap();
//! assert_eq!(cap.define_name(), "HAVE_SQLITE3");
//!
//! let v = VersionEncoding::PackedHex.decode("0x10101000L").unwrap();
//! assert_eq!(v, Version::new(1, 1, 0));
//! ```

pub mod capability;
pub mod definition;
pub mod environment;
pub mod features;
pub mod frameworks;
pub mod plan;
pub mod prober;
pub mod root;
pub mod version;

pub use capability::{Capability, CapabilityRecord};
pub use definition::{DefinitionRegistry, ProbeDefinition, VersionSource, DEFAULT_PREFIXES};
pub use environment::ConfigEnvironment;
pub use features::{builtin_features, FeatureCheck};
pub use frameworks::OSX_FRAMEWORKS;
pub use plan::{ProbePlan, ProbeRequest};
pub use prober::{ProbeEvent, ProbeOutcome, Prober};
pub use root::resolve_root;
pub use version::{compile_pattern, parse_version_text, Version, VersionEncoding};

//! depprobe - Native dependency discovery for C++ builds.
//!
//! depprobe finds the third-party libraries a C++ project links against,
//! checks their versions, proves they link with a small test program and
//! records the results as preprocessor defines and build flags.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Manifest loading, merging, and validation
//! - [`docs`] - Documentation generator metadata
//! - [`error`] - Error types and result aliases
//! - [`output`] - Rendering of the probed environment
//! - [`probe`] - Capability definitions, version parsing, and the prober
//! - [`toolchain`] - Build/host platforms and the C++ compiler
//! - [`ui`] - Spinners, check lines, and terminal output
//!
//! # Example
//!
//! ```
//! use depprobe::probe::{compile_pattern, parse_version_text, Version, VersionEncoding};
//!
//! let pattern = compile_pattern(r#"#define SQLITE_VERSION\s+"([0-9.]+)""#).unwrap();
//! let header = "#define SQLITE_VERSION        \"3.31.1\"\n";
//! let version = parse_version_text(header, &pattern, VersionEncoding::Dotted);
//! assert_eq!(version, Some(Version::new(3, 31, 1)));
//! ```
//!
//! For running probes against a real compiler, see the integration tests.

pub mod cli;
pub mod config;
pub mod docs;
pub mod error;
pub mod output;
pub mod probe;
pub mod toolchain;
pub mod ui;

pub use error::{ProbeError, Result};

//! `cargo:` directives for Rust build scripts.
//!
//! Printing the output of `depprobe configure --format cargo` from a
//! `build.rs` links the detected libraries into the crate being built.

use crate::probe::{Capability, ConfigEnvironment};

/// Render link and cfg directives for every registered capability.
pub fn render_cargo(env: &ConfigEnvironment) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (capability, record) in env.capabilities() {
        let is_framework = *capability == Capability::OsxFrameworks;

        if let Some(path) = &record.library_path {
            lines.push(format!("cargo:rustc-link-search=native={}", path.display()));
        }
        for lib in &record.library_names {
            if is_framework {
                lines.push(format!("cargo:rustc-link-lib=framework={}", lib));
            } else {
                lines.push(format!("cargo:rustc-link-lib={}", lib));
            }
        }
        for flag in &record.extra_flags {
            match flag.strip_prefix("-l") {
                Some(lib) => lines.push(format!("cargo:rustc-link-lib={}", lib)),
                None => lines.push(format!("cargo:rustc-link-arg={}", flag)),
            }
        }
        if let Some(include) = &record.include_path {
            lines.push(format!("cargo:include={}", include.display()));
        }
    }

    for (name, value) in env.defines() {
        if value == "1" {
            lines.push(format!("cargo:rustc-cfg={}", name.to_ascii_lowercase()));
        }
    }

    lines.iter().map(|line| format!("{}\n", line)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_env;
    use crate::probe::frameworks::frameworks_record;

    #[test]
    fn emits_search_path_libs_and_cfgs() {
        let out = render_cargo(&sample_env());
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "cargo:rustc-link-search=native=/opt/local/lib");
        assert!(lines.contains(&"cargo:rustc-link-lib=ssl"));
        assert!(lines.contains(&"cargo:rustc-link-lib=crypto"));
        assert!(lines.contains(&"cargo:rustc-link-lib=dl"));
        assert!(lines.contains(&"cargo:include=/opt/local/include"));
        assert!(lines.contains(&"cargo:rustc-cfg=have_openssl"));
        assert!(lines.contains(&"cargo:rustc-cfg=have_std_to_string"));
        assert!(!out.contains("PROBED_VERSION"));
    }

    #[test]
    fn empty_environment_renders_nothing() {
        let env = ConfigEnvironment::new(crate::toolchain::PlatformPair::default());
        assert_eq!(render_cargo(&env), "");
    }

    #[test]
    fn every_directive_ends_with_newline() {
        let out = render_cargo(&sample_env());
        assert!(out.ends_with('\n'));
        assert!(!out.contains("\n\n"));
    }

    #[test]
    fn frameworks_use_framework_kind() {
        let mut env = sample_env();
        env.register(Capability::OsxFrameworks, frameworks_record());
        let out = render_cargo(&env);
        assert!(out.contains("cargo:rustc-link-lib=framework=Security"));
    }
}

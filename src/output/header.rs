//! C/C++ config header output.

use chrono::{DateTime, Utc};

use crate::probe::ConfigEnvironment;

/// Include guard for `project`, e.g. `NDN_CXX_CONFIG_HPP` for `ndn-cxx`.
pub fn include_guard(project: Option<&str>) -> String {
    let stem: String = project
        .unwrap_or("depprobe")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "DEPPROBE_CONFIG_HPP".to_string()
    } else {
        format!("{}_CONFIG_HPP", stem)
    }
}

/// Render a header with one `#define` per define, in name order.
pub fn render_header(env: &ConfigEnvironment, project: Option<&str>, now: DateTime<Utc>) -> String {
    let guard = include_guard(project);
    let mut out = String::new();

    out.push_str(&format!(
        "// Generated by depprobe on {}. Do not edit.\n",
        now.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));

    for (name, value) in env.defines() {
        out.push_str(&format!("#define {} {}\n", name, value));
    }
    if !env.defines().is_empty() {
        out.push('\n');
    }

    out.push_str(&format!("#endif // {}\n", guard));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_env;
    use chrono::TimeZone;

    #[test]
    fn guard_is_derived_from_project() {
        assert_eq!(include_guard(Some("ndn-cxx")), "NDN_CXX_CONFIG_HPP");
        assert_eq!(include_guard(None), "DEPPROBE_CONFIG_HPP");
        assert_eq!(include_guard(Some("--")), "DEPPROBE_CONFIG_HPP");
    }

    #[test]
    fn header_contains_every_define_inside_guard() {
        let env = sample_env();
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let header = render_header(&env, Some("demo"), now);

        assert!(header.starts_with("// Generated by depprobe on 2026-10-18 12:00:00 UTC"));
        assert!(header.contains("#ifndef DEMO_CONFIG_HPP\n#define DEMO_CONFIG_HPP\n"));
        assert!(header.contains("#define HAVE_OPENSSL 1\n"));
        assert!(header.contains("#define OPENSSL_PROBED_VERSION \"1.1.0\"\n"));
        assert!(header.trim_end().ends_with("#endif // DEMO_CONFIG_HPP"));
    }
}

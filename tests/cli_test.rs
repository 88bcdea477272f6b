//! Integration tests for the depprobe binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Install a fake zlib under `dir` and return its root.
fn install_zlib(dir: &Path, version: &str) -> PathBuf {
    let root = dir.join("zlib");
    fs::create_dir_all(root.join("include")).unwrap();
    fs::create_dir_all(root.join("lib")).unwrap();
    fs::write(
        root.join("include/zlib.h"),
        format!("#define ZLIB_VERSION \"{}\"\n", version),
    )
    .unwrap();
    root
}

fn setup_project(mandatory: bool) -> TempDir {
    let temp = TempDir::new().unwrap();
    let empty = temp.path().join("empty");
    fs::create_dir_all(&empty).unwrap();
    fs::write(
        temp.path().join("depprobe.yml"),
        format!(
            r#"
project: demo
builtin_features: false
capabilities:
  zlib:
    mandatory: {mandatory}
    min_version: "1.2"
custom:
  - name: zlib
    search_paths: ["{empty}"]
    version_file: include/zlib.h
    version_pattern: 'ZLIB_VERSION "([0-9.]+)"'
    libraries: [z]
    fragment: "int main() {{ return 0; }}"
docs:
  project: Demo library
  author: Demo Authors
  man_pages:
    - source: manpages/demo-tool
      name: demo-tool
      description: Demo command line tool
"#,
            mandatory = mandatory,
            empty = empty.display()
        ),
    )
    .unwrap();
    temp
}

fn depprobe(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("depprobe"));
    cmd.current_dir(dir)
        .env_remove("DEPPROBE_CONFIG")
        .env_remove("DEPPROBE_HOST")
        .env_remove("CXXFLAGS")
        .env_remove("LDFLAGS")
        .args(["--host", "x86_64-linux-gnu"]);
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("depprobe"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Native dependency discovery"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("depprobe"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn configure_with_explicit_path_writes_header() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(true);
    let root = install_zlib(temp.path(), "1.2.13");

    let mut cmd = depprobe(temp.path());
    cmd.env("CXX", "true")
        .arg(format!("--with-zlib={}", root.display()))
        .args(["configure", "--format", "header"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("#ifndef DEMO_CONFIG_HPP"))
        .stdout(predicate::str::contains("#define HAVE_ZLIB 1"))
        .stdout(predicate::str::contains("#define ZLIB_PROBED_VERSION \"1.2.13\""))
        .stderr(predicate::str::contains("Checking for 'zlib' ... yes (1.2.13)"));
    Ok(())
}

#[test]
fn configure_is_the_default_command() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(true);
    let root = install_zlib(temp.path(), "1.3");

    let mut cmd = depprobe(temp.path());
    cmd.env("CXX", "true").args(["--with-zlib", root.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("zlib 1.3.0"))
        .stdout(predicate::str::contains("#define HAVE_ZLIB 1"));
    Ok(())
}

#[test]
fn configure_writes_output_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(true);
    let root = install_zlib(temp.path(), "1.2.13");
    let out = temp.path().join("build/config.json");

    let mut cmd = depprobe(temp.path());
    cmd.env("CXX", "true")
        .args(["--with", &format!("zlib={}", root.display())])
        .args(["configure", "--format", "json", "-o"])
        .arg(&out);
    cmd.assert().success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out)?)?;
    assert_eq!(json["project"], "demo");
    assert_eq!(json["defines"]["HAVE_ZLIB"], "1");
    Ok(())
}

#[test]
fn mandatory_capability_missing_exits_one() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(true);

    let mut cmd = depprobe(temp.path());
    cmd.env("CXX", "true").arg("configure");
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Checking for 'zlib' ... not found"))
        .stderr(predicate::str::contains("--with-zlib=PATH"));
    Ok(())
}

#[test]
fn optional_capability_missing_still_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(false);

    let mut cmd = depprobe(temp.path());
    cmd.env("CXX", "true").arg("configure");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("HAVE_ZLIB").not())
        .stderr(predicate::str::contains("Checking for 'zlib' ... not found"));
    Ok(())
}

#[test]
fn too_old_version_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(true);
    let root = install_zlib(temp.path(), "1.1.4");

    let mut cmd = depprobe(temp.path());
    cmd.env("CXX", "true")
        .arg(format!("--with-zlib={}", root.display()))
        .arg("configure");
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("too old"));
    Ok(())
}

#[test]
fn broken_compiler_exits_one() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(false);

    let mut cmd = depprobe(temp.path());
    cmd.env("CXX", "false").arg("configure");
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Checking for 'C++ compiler'"));
    Ok(())
}

#[test]
fn invalid_manifest_exits_two() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(
        temp.path().join("depprobe.yml"),
        "capabilities:\n  libnothing: {}\n",
    )?;

    let mut cmd = depprobe(temp.path());
    cmd.env("CXX", "true").arg("configure");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("libnothing"));
    Ok(())
}

#[test]
fn missing_config_override_exits_two() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;

    let mut cmd = depprobe(temp.path());
    cmd.args(["--config", "nope.yml", "list"]);
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration not found"));
    Ok(())
}

#[test]
fn probe_reports_missing_optional_capability() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(true);

    let mut cmd = depprobe(temp.path());
    cmd.env("CXX", "true").args(["probe", "zlib"]);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("zlib not found"));
    Ok(())
}

#[test]
fn probe_with_path_prints_summary() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(false);
    let root = install_zlib(temp.path(), "1.2.13");

    let mut cmd = depprobe(temp.path());
    cmd.env("CXX", "true")
        .args(["probe", "zlib", "--path"])
        .arg(&root);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("zlib 1.2.13"))
        .stdout(predicate::str::contains("-lz"));
    Ok(())
}

#[test]
fn alias_keyed_manifest_entry_sets_root() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let root = temp.path().join("sqlite");
    fs::create_dir_all(root.join("include"))?;
    fs::write(
        root.join("include/sqlite3.h"),
        "#define SQLITE_VERSION \"3.99.0\"\n",
    )?;
    fs::write(
        temp.path().join("depprobe.yml"),
        format!("capabilities:\n  sqlite:\n    path: {}\n", root.display()),
    )?;

    let mut cmd = depprobe(temp.path());
    cmd.env("CXX", "true").args(["probe", "sqlite3"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("sqlite3 3.99.0"))
        .stderr(predicate::str::contains("Checking for 'sqlite3' ... yes (3.99.0)"));
    Ok(())
}

#[test]
fn alias_and_canonical_key_together_exit_two() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(
        temp.path().join("depprobe.yml"),
        "capabilities:\n  sqlite:\n  sqlite3:\n",
    )?;

    let mut cmd = depprobe(temp.path());
    cmd.env("CXX", "true").arg("configure");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("listed twice"));
    Ok(())
}

#[test]
fn probe_unknown_capability_exits_two() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;

    let mut cmd = depprobe(temp.path());
    cmd.env("CXX", "true").args(["probe", "libnothing"]);
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown capability: libnothing"));
    Ok(())
}

#[test]
fn list_shows_builtin_and_custom_probes() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(true);

    let mut cmd = depprobe(temp.path());
    cmd.arg("list");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("openssl"))
        .stdout(predicate::str::contains("cryptopp"))
        .stdout(predicate::str::contains("zlib"));
    Ok(())
}

#[test]
fn list_json_is_parseable() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;

    let output = depprobe(temp.path()).args(["list", "--json"]).output()?;
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["host"], "x86_64-linux-gnu");
    assert!(json["features"].as_array().is_some_and(|f| !f.is_empty()));
    Ok(())
}

#[test]
fn docs_lists_man_pages() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(true);

    let mut cmd = depprobe(temp.path());
    cmd.arg("docs");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("project: Demo library"))
        .stdout(predicate::str::contains(
            "demo-tool(1) manpages/demo-tool - Demo command line tool (Demo Authors)",
        ));
    Ok(())
}

#[test]
fn schema_is_json() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;

    let output = depprobe(temp.path()).arg("schema").output()?;
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert!(json["properties"]["capabilities"].is_object());
    Ok(())
}

#[test]
fn completions_for_bash() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("depprobe"));
    cmd.args(["completions", "bash"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("depprobe"));
    Ok(())
}

//! Installation root resolution.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ProbeError, Result};
use crate::probe::capability::Capability;

/// Find the installation root for `capability`.
///
/// A root qualifies when it contains any of `version_files`. An explicit
/// path is used when it qualifies. If it does not, a warning is logged and
/// the search list is tried instead. Otherwise the first qualifying entry
/// of `search_paths` wins.
pub fn resolve_root(
    capability: &Capability,
    explicit: Option<&Path>,
    search_paths: &[PathBuf],
    version_files: &[&Path],
) -> Result<PathBuf> {
    let mut searched = Vec::new();

    if let Some(root) = explicit {
        searched.push(root.to_path_buf());
        if holds_any(root, version_files) {
            debug!("{}: using explicit root {}", capability, root.display());
            return Ok(root.to_path_buf());
        }
        warn!(
            "{}: {} does not contain {}; trying default locations",
            capability,
            root.display(),
            describe(version_files)
        );
    }

    for root in search_paths {
        debug!("{}: checking {}", capability, root.display());
        if holds_any(root, version_files) {
            return Ok(root.clone());
        }
        searched.push(root.clone());
    }

    Err(ProbeError::NotFound {
        capability: capability.name().to_string(),
        searched,
    })
}

fn holds_any(root: &Path, version_files: &[&Path]) -> bool {
    version_files.iter().any(|file| root.join(file).is_file())
}

fn describe(version_files: &[&Path]) -> String {
    version_files
        .iter()
        .map(|file| file.display().to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const VERSION_FILE: &str = "include/sqlite3.h";

    fn make_root(base: &Path, name: &str, with_header: bool) -> PathBuf {
        let root = base.join(name);
        fs::create_dir_all(root.join("include")).unwrap();
        if with_header {
            fs::write(root.join(VERSION_FILE), "#define SQLITE_VERSION \"3.31.1\"\n").unwrap();
        }
        root
    }

    #[test]
    fn first_matching_search_path_wins() {
        let temp = TempDir::new().unwrap();
        let empty = make_root(temp.path(), "empty", false);
        let first = make_root(temp.path(), "first", true);
        let second = make_root(temp.path(), "second", true);

        let root = resolve_root(
            &Capability::Sqlite3,
            None,
            &[empty, first.clone(), second],
            &[Path::new(VERSION_FILE)],
        )
        .unwrap();
        assert_eq!(root, first);
    }

    #[test]
    fn valid_explicit_path_beats_search_list() {
        let temp = TempDir::new().unwrap();
        let explicit = make_root(temp.path(), "explicit", true);
        let default = make_root(temp.path(), "default", true);

        let root = resolve_root(
            &Capability::Sqlite3,
            Some(&explicit),
            &[default],
            &[Path::new(VERSION_FILE)],
        )
        .unwrap();
        assert_eq!(root, explicit);
    }

    #[test]
    fn invalid_explicit_path_falls_through() {
        let temp = TempDir::new().unwrap();
        let explicit = make_root(temp.path(), "explicit", false);
        let default = make_root(temp.path(), "default", true);

        let root = resolve_root(
            &Capability::Sqlite3,
            Some(&explicit),
            &[default.clone()],
            &[Path::new(VERSION_FILE)],
        )
        .unwrap();
        assert_eq!(root, default);
    }

    #[test]
    fn nothing_found_lists_every_candidate() {
        let temp = TempDir::new().unwrap();
        let explicit = make_root(temp.path(), "explicit", false);
        let a = make_root(temp.path(), "a", false);
        let b = temp.path().join("does-not-exist");

        let err = resolve_root(
            &Capability::Sqlite3,
            Some(&explicit),
            &[a.clone(), b.clone()],
            &[Path::new(VERSION_FILE)],
        )
        .unwrap_err();

        match err {
            ProbeError::NotFound {
                capability,
                searched,
            } => {
                assert_eq!(capability, "sqlite3");
                assert_eq!(searched, vec![explicit, a, b]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn directory_named_like_version_file_does_not_count() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("odd");
        fs::create_dir_all(root.join(VERSION_FILE)).unwrap();

        let result = resolve_root(
            &Capability::Sqlite3,
            None,
            &[root],
            &[Path::new(VERSION_FILE)],
        );
        assert!(matches!(result, Err(ProbeError::NotFound { .. })));
    }

    #[test]
    fn any_candidate_file_qualifies_a_root() {
        let temp = TempDir::new().unwrap();
        let old_layout = temp.path().join("old");
        fs::create_dir_all(old_layout.join("include/cryptopp")).unwrap();
        fs::write(old_layout.join("include/cryptopp/config.h"), "").unwrap();

        let root = resolve_root(
            &Capability::CryptoPp,
            None,
            &[old_layout.clone()],
            &[
                Path::new("include/cryptopp/config_ver.h"),
                Path::new("include/cryptopp/config.h"),
            ],
        )
        .unwrap();
        assert_eq!(root, old_layout);
    }
}

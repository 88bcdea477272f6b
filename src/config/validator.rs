//! Manifest validation rules.
//!
//! This module validates a manifest for correctness:
//! - Listed capabilities must be built-in or defined under `custom`
//! - Custom probes must not shadow built-ins or each other
//! - Version patterns must compile with one or two capture groups
//! - Feature defines must be unique C identifiers
//! - Documentation metadata must be well-formed

use std::collections::HashSet;

use crate::config::schema::ProbeManifest;
use crate::error::{ProbeError, Result};
use crate::probe::capability::Capability;
use crate::probe::version::compile_pattern;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Capability name if the error is capability-specific
    pub capability: Option<String>,
}

impl ValidationError {
    fn new(rule: &str, message: String, capability: Option<&str>) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            capability: capability.map(String::from),
        }
    }
}

/// Validate a manifest and return all errors.
///
/// All errors are collected so users can fix several issues at once.
pub fn validate_manifest(manifest: &ProbeManifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_custom(manifest));
    errors.extend(validate_capabilities(manifest));
    errors.extend(validate_features(manifest));

    if let Some(docs) = &manifest.docs {
        errors.extend(
            docs.problems()
                .into_iter()
                .map(|message| ValidationError::new("docs", message, None)),
        );
    }

    errors
}

fn validate_custom(manifest: &ProbeManifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for custom in &manifest.custom {
        let name = custom.name.as_str();
        match name.parse::<Capability>() {
            Ok(cap) if cap.is_builtin() => errors.push(ValidationError::new(
                "custom-shadows-builtin",
                format!("Custom probe '{}' has the name of a built-in capability", name),
                Some(name),
            )),
            Ok(_) => {}
            Err(_) => errors.push(ValidationError::new(
                "invalid-name",
                format!(
                    "Custom probe name '{}' may only contain letters, digits, '-', '_' and '+'",
                    name
                ),
                Some(name),
            )),
        }

        if !seen.insert(name.to_ascii_lowercase()) {
            errors.push(ValidationError::new(
                "duplicate-custom",
                format!("Custom probe '{}' is defined more than once", name),
                Some(name),
            ));
        }

        if let Err(e) = compile_pattern(&custom.version_pattern) {
            errors.push(ValidationError::new(
                "invalid-pattern",
                format!("Custom probe '{}': {}", name, e),
                Some(name),
            ));
        }

        if custom.fragment.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-fragment",
                format!("Custom probe '{}' has an empty fragment", name),
                Some(name),
            ));
        }
    }

    errors
}

fn validate_capabilities(manifest: &ProbeManifest) -> Vec<ValidationError> {
    let custom: HashSet<String> = manifest
        .custom
        .iter()
        .map(|c| c.name.to_ascii_lowercase())
        .collect();

    manifest
        .capabilities
        .iter()
        .filter_map(|entry| match entry.name.parse::<Capability>() {
            Ok(cap) if cap.is_builtin() || custom.contains(cap.name()) => None,
            _ => Some(ValidationError::new(
                "unknown-capability",
                format!(
                    "Capability '{}' is neither built-in ({}) nor defined under 'custom'",
                    entry.name,
                    Capability::builtin_names().join(", ")
                ),
                Some(&entry.name),
            )),
        })
        .collect()
}

fn validate_features(manifest: &ProbeManifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for feature in &manifest.features {
        let define = feature.define.as_str();
        if !is_identifier(define) {
            errors.push(ValidationError::new(
                "invalid-define",
                format!("Feature define '{}' is not a valid C identifier", define),
                None,
            ));
        }
        if !seen.insert(define) {
            errors.push(ValidationError::new(
                "duplicate-define",
                format!("Feature define '{}' is checked more than once", define),
                None,
            ));
        }
        if feature.fragment.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-fragment",
                format!("Feature '{}' has an empty fragment", define),
                None,
            ));
        }
    }

    errors
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate and return Result (for convenience).
///
/// # Errors
///
/// Returns `ConfigValidationError` if any validation rules fail.
pub fn validate(manifest: &ProbeManifest) -> Result<()> {
    let errors = validate_manifest(manifest);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(ProbeError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}

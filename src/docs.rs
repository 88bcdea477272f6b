//! Documentation generator metadata.
//!
//! The `docs` section of the manifest carries the static settings a
//! documentation build needs: project title, copyright, theme, master
//! document and the list of man pages to produce.

use std::collections::HashSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, Result};

/// Documentation settings for the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DocsConfig {
    /// Project title shown in generated documentation.
    pub project: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// HTML theme name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// Root document, without extension.
    #[serde(default = "default_master_doc")]
    pub master_doc: String,

    #[serde(default)]
    pub man_pages: Vec<ManPage>,
}

fn default_master_doc() -> String {
    "index".to_string()
}

impl DocsConfig {
    /// Settings with only a project title.
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            copyright: None,
            author: None,
            theme: None,
            master_doc: default_master_doc(),
            man_pages: Vec::new(),
        }
    }

    /// Every problem with these settings, empty when valid.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.project.trim().is_empty() {
            problems.push("docs: project title must not be empty".to_string());
        }
        if self.master_doc.trim().is_empty() {
            problems.push("docs: master_doc must not be empty".to_string());
        }

        let mut names = HashSet::new();
        for page in &self.man_pages {
            if page.name.trim().is_empty() {
                problems.push(format!("docs: man page from '{}' has no name", page.source));
                continue;
            }
            if page.source.trim().is_empty() {
                problems.push(format!("docs: man page '{}' has no source", page.name));
            }
            if !(1..=9).contains(&page.section) {
                problems.push(format!(
                    "docs: man page '{}' has section {}, expected 1 to 9",
                    page.name, page.section
                ));
            }
            if !names.insert((page.name.as_str(), page.section)) {
                problems.push(format!("docs: man page '{}' is listed twice", page));
            }
        }

        problems
    }

    /// Check the settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` listing every problem found.
    pub fn validate(&self) -> Result<()> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ProbeError::ConfigValidationError {
                message: problems.join("; "),
            })
        }
    }

    /// Man pages in one section.
    pub fn pages_in_section(&self, section: u8) -> impl Iterator<Item = &ManPage> {
        self.man_pages.iter().filter(move |p| p.section == section)
    }
}

/// One man page to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ManPage {
    /// Source document, relative to the docs directory.
    pub source: String,
    /// Page name, e.g. `ndnsec-key-gen`.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Overrides the project author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    /// Manual section, 1 to 9.
    #[serde(default = "default_section")]
    pub section: u8,
}

fn default_section() -> u8 {
    1
}

impl fmt::Display for ManPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.section)
    }
}

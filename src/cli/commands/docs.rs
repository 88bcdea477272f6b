//! Docs command implementation.
//!
//! The `depprobe docs` command prints the documentation settings from the
//! manifest's `docs` section.

use crate::cli::args::DocsArgs;
use crate::cli::context::ProbeContext;
use crate::docs::DocsConfig;
use crate::error::Result;
use crate::output::write_output;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The docs command implementation.
pub struct DocsCommand {
    context: ProbeContext,
    args: DocsArgs,
}

impl DocsCommand {
    /// Create a new docs command.
    pub fn new(context: ProbeContext, args: DocsArgs) -> Self {
        Self { context, args }
    }

    fn render(&self, docs: &DocsConfig) -> Result<String> {
        if self.args.json {
            let mut json = if self.args.man_pages {
                serde_json::to_string_pretty(&docs.man_pages)
            } else {
                serde_json::to_string_pretty(docs)
            }
            .map_err(anyhow::Error::from)?;
            json.push('\n');
            return Ok(json);
        }

        let mut out = String::new();
        if !self.args.man_pages {
            out.push_str(&format!("project: {}\n", docs.project));
            if let Some(author) = &docs.author {
                out.push_str(&format!("author: {}\n", author));
            }
            if let Some(copyright) = &docs.copyright {
                out.push_str(&format!("copyright: {}\n", copyright));
            }
            if let Some(theme) = &docs.theme {
                out.push_str(&format!("theme: {}\n", theme));
            }
            out.push_str(&format!("master_doc: {}\n", docs.master_doc));
            out.push_str("man pages:\n");
        }

        for section in 1..=9u8 {
            for page in docs.pages_in_section(section) {
                let authors = page
                    .authors
                    .as_deref()
                    .or(docs.author.as_deref())
                    .unwrap_or("");
                let line = format!("{} {} - {}", page, page.source, page.description);
                if authors.is_empty() {
                    out.push_str(&format!("  {}\n", line));
                } else {
                    out.push_str(&format!("  {} ({})\n", line, authors));
                }
            }
        }
        Ok(out)
    }
}

impl Command for DocsCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let loaded = self.context.manifest()?;
        let docs = match &loaded.manifest.docs {
            Some(docs) => docs,
            None => {
                ui.warning("No docs section in the manifest");
                return Ok(CommandResult::failure(1));
            }
        };

        docs.validate()?;
        write_output(&self.render(docs)?, None)?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::ManPage;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn sample_docs() -> DocsConfig {
        let mut docs = DocsConfig::new("NDN C++ library");
        docs.author = Some("Named Data Networking Project".to_string());
        docs.man_pages = vec![
            ManPage {
                source: "manpages/ndnsec".into(),
                name: "ndnsec".into(),
                description: "NDN security toolkit".into(),
                authors: None,
                section: 1,
            },
            ManPage {
                source: "manpages/ndn-client.conf".into(),
                name: "ndn-client.conf".into(),
                description: "Configuration file for NDN platform".into(),
                authors: Some("Alex".into()),
                section: 5,
            },
        ];
        docs
    }

    fn command(args: DocsArgs) -> DocsCommand {
        DocsCommand::new(ProbeContext::new("/nonexistent"), args)
    }

    #[test]
    fn renders_metadata_and_pages() {
        let text = command(DocsArgs::default()).render(&sample_docs()).unwrap();
        assert!(text.starts_with("project: NDN C++ library\n"));
        assert!(text.contains("master_doc: index"));
        assert!(text.contains(
            "  ndnsec(1) manpages/ndnsec - NDN security toolkit (Named Data Networking Project)"
        ));
        assert!(text.contains("ndn-client.conf(5)"));
        assert!(text.contains("(Alex)"));
    }

    #[test]
    fn man_pages_only() {
        let args = DocsArgs {
            man_pages: true,
            json: false,
        };
        let text = command(args).render(&sample_docs()).unwrap();
        assert!(!text.contains("project:"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn json_man_pages() {
        let args = DocsArgs {
            man_pages: true,
            json: true,
        };
        let json = command(args).render(&sample_docs()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[1]["section"], 5);
    }

    #[test]
    fn missing_docs_section_warns() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("depprobe.yml"), "project: demo\n").unwrap();
        let cmd = DocsCommand::new(ProbeContext::new(temp.path()), DocsArgs::default());
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();
        assert_eq!(result.exit_code, 1);
        assert!(ui.has_warning("No docs section"));
    }
}

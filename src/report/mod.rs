//! Report generation.
//!
//! The HTML report is the main artifact of a run; the JSON outputs carry
//! the same data in machine-readable form.

pub mod html;
pub mod json;

use anyhow::{Context, Result};
use std::path::Path;

pub use html::render as render_html;
pub use json::{build_summary, generate_results_json, generate_summary_json};

/// Default file name for the HTML report.
pub const DEFAULT_REPORT_FILE: &str = "ai_visibility_report.html";

/// A rendered, self-contained report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub filename: String,
    pub media_type: &'static str,
    pub content: String,
}

impl ReportDocument {
    pub fn html(content: String) -> Self {
        Self {
            filename: DEFAULT_REPORT_FILE.to_string(),
            media_type: "text/html",
            content,
        }
    }

    /// Write the document to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        write_output(path, &self.content)
    }
}

/// Write a text artifact, naming the path on failure.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

// src/render/mod.rs

use crate::error::ScrapeError;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Boundary to the external document-rendering tool, so the pipeline can be
/// exercised in tests without invoking a subprocess.
pub trait DocumentRenderer: Send + Sync {
    /// Render the Markdown file at `markdown` into a paginated document at
    /// `output`.
    fn render(&self, markdown: &Path, output: &Path) -> Result<(), ScrapeError>;
}

/// Renders via `pandoc`. Blocking; callers on an async runtime should run
/// it on the blocking pool.
#[derive(Debug, Clone)]
pub struct PandocRenderer {
    pub pdf_engine: String,
    pub margin: String,
}

impl Default for PandocRenderer {
    fn default() -> Self {
        Self {
            pdf_engine: "xelatex".to_string(),
            margin: "2cm".to_string(),
        }
    }
}

impl DocumentRenderer for PandocRenderer {
    fn render(&self, markdown: &Path, output: &Path) -> Result<(), ScrapeError> {
        debug!(input = %markdown.display(), output = %output.display(), "pandoc");
        let result = Command::new("pandoc")
            .arg(format!("--pdf-engine={}", self.pdf_engine))
            .arg("-V")
            .arg(format!("geometry:margin={}", self.margin))
            .arg(markdown)
            .arg("-o")
            .arg(output)
            .output()?;

        if !result.status.success() {
            return Err(ScrapeError::Render {
                input: markdown.to_path_buf(),
                detail: format!(
                    "pandoc exited with {}: {}",
                    result.status,
                    String::from_utf8_lossy(&result.stderr).trim()
                ),
            });
        }
        Ok(())
    }
}

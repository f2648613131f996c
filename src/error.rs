// src/error.rs

use std::path::PathBuf;

/// Errors that can occur while scraping, transforming, or rendering a
/// country profile.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// An HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// A fixed structural marker was absent from the fetched page. The page
    /// cannot be transformed without it.
    #[error("expected element `{selector}` not found in {context}")]
    MissingElement {
        selector: &'static str,
        context: &'static str,
    },

    /// The document renderer exited unsuccessfully.
    #[error("renderer failed on {input:?}: {detail}")]
    Render { input: PathBuf, detail: String },

    /// Writing the aggregate table failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

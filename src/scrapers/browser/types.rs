//! Browser render result and error types.

use thiserror::Error;

/// Snapshot of a page after client-side rendering.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL that was requested.
    pub url: String,
    /// URL after redirects.
    pub final_url: String,
    /// Serialized DOM at sampling time.
    pub html: String,
}

/// Errors raised while rendering a single page.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Browser support not compiled. Rebuild with: cargo build --features browser")]
    BrowserUnavailable,

    #[error("Failed to start browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out after {secs}s rendering {url}")]
    Timeout { url: String, secs: u64 },

    #[error("Failed to read rendered content of {url}: {reason}")]
    Content { url: String, reason: String },
}

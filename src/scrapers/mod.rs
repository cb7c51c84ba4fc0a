//! Network access for the pipeline: plain HTTP, headless rendering, and the
//! politeness gate both of them wait on.

pub mod browser;
mod http_client;
pub mod politeness;

pub use browser::{BrowserEngineConfig, BrowserFetcher, RenderError, RenderedPage};
pub use http_client::{resolve_user_agent, FetchError, HttpClient, USER_AGENT};
pub use politeness::{PolitenessGate, PolitenessPolicy};

use async_trait::async_trait;

/// Source of page bodies for discovery and plain-HTTP extraction.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page as text. Non-success statuses are errors.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Source of rendered DOM snapshots for the browser pipeline.
#[async_trait]
pub trait PageRenderer: Send {
    /// Render a page with JavaScript enabled and return the settled DOM.
    async fn render(&mut self, url: &str) -> Result<RenderedPage, RenderError>;

    /// Release the rendering engine.
    async fn close(&mut self);
}

//! Stub fetcher and renderer shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use dealscout::scrapers::{FetchError, PageFetcher, PageRenderer, RenderError, RenderedPage};

/// Serves canned bodies by exact URL; unknown URLs are 404s.
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// Renders canned snapshots; unknown URLs fail navigation.
#[derive(Default)]
pub struct StubRenderer {
    pages: HashMap<String, String>,
    pub rendered: Vec<String>,
    pub closed: bool,
}

impl StubRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }
}

#[async_trait]
impl PageRenderer for StubRenderer {
    async fn render(&mut self, url: &str) -> Result<RenderedPage, RenderError> {
        self.rendered.push(url.to_string());
        match self.pages.get(url) {
            Some(html) => Ok(RenderedPage {
                url: url.to_string(),
                final_url: url.to_string(),
                html: html.clone(),
            }),
            None => Err(RenderError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            }),
        }
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

/// A page carrying one JSON-LD Product.
pub fn jsonld_page(name: &str, now: f64, was: Option<f64>) -> String {
    let spec = was
        .map(|w| format!(r#","priceSpecification":{{"price":{}}}"#, w))
        .unwrap_or_default();
    format!(
        r#"<html><head><script type="application/ld+json">
        {{"@context":"https://schema.org","@type":"Product","name":"{}","offers":{{"price":{}{}}}}}
        </script></head><body></body></html>"#,
        name, now, spec
    )
}

//! Scoped ownership of a browser tab.

use std::ops::Deref;

use chromiumoxide::Page;
use tracing::{debug, warn};

/// Owns one browser tab for the duration of a render.
///
/// The preferred release path is [`PageGuard::close`]. If the guard is
/// dropped without it (an early `?` return, a panic in the caller), `Drop`
/// spawns the close on the runtime captured at construction, so a tab is
/// never leaked across pages.
pub struct PageGuard {
    page: Option<Page>,
    url: String,
    runtime: tokio::runtime::Handle,
}

impl PageGuard {
    pub fn new(page: Page, url: &str) -> Self {
        Self {
            page: Some(page),
            url: url.to_string(),
            runtime: tokio::runtime::Handle::current(),
        }
    }

    /// Close the tab, consuming the guard.
    pub async fn close(mut self) {
        if let Some(page) = self.page.take() {
            match page.close().await {
                Ok(()) => debug!("Closed tab for {}", self.url),
                Err(e) => warn!("Failed to close tab for {}: {}", self.url, e),
            }
        }
    }
}

impl Deref for PageGuard {
    type Target = Page;

    fn deref(&self) -> &Page {
        // Only `close` and `drop` take the page, and both consume the guard.
        self.page.as_ref().expect("PageGuard used after close")
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            let url = std::mem::take(&mut self.url);
            self.runtime.spawn(async move {
                if let Err(e) = page.close().await {
                    warn!("Deferred tab close failed for {}: {}", url, e);
                }
            });
        }
    }
}

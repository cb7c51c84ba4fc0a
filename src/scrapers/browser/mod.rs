//! Headless browser renderer for client-side rendered storefronts.
//!
//! Uses chromiumoxide (CDP). One browser process serves a whole run; each
//! URL gets its own tab, which is released before the next URL is processed
//! whether or not rendering succeeded.

mod config;
#[cfg(feature = "browser")]
mod guard;
mod types;

pub use config::BrowserEngineConfig;
pub use types::{RenderError, RenderedPage};

#[cfg(feature = "browser")]
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(feature = "browser")]
use tokio::sync::Mutex;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig};
#[cfg(feature = "browser")]
use futures::StreamExt;

#[cfg(feature = "browser")]
use self::guard::PageGuard;
use super::PageRenderer;

/// Resolves once no new resource entries have appeared for 500ms, or after
/// 10s regardless. This approximates network quiescence from inside the page.
#[cfg(feature = "browser")]
const NETWORK_QUIET_SCRIPT: &str = r#"
    new Promise((resolve) => {
        let last = performance.getEntriesByType('resource').length;
        let quiet = 0;
        const timer = setInterval(() => {
            const now = performance.getEntriesByType('resource').length;
            if (now === last) {
                quiet += 100;
            } else {
                quiet = 0;
                last = now;
            }
            if (quiet >= 500) {
                clearInterval(timer);
                resolve(now);
            }
        }, 100);
        setTimeout(() => { clearInterval(timer); resolve(-1); }, 10000);
    })
"#;

/// Browser-based renderer.
#[cfg(feature = "browser")]
pub struct BrowserFetcher {
    config: BrowserEngineConfig,
    user_agent: String,
    browser: Option<Arc<Mutex<Browser>>>,
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Create a new browser renderer. The browser starts lazily on the
    /// first render.
    pub fn new(config: BrowserEngineConfig, user_agent: String) -> Self {
        Self {
            config,
            user_agent,
            browser: None,
        }
    }

    /// Find a Chrome executable.
    fn find_chrome() -> Result<std::path::PathBuf, RenderError> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in [
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(path) = which::which(cmd) {
                info!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(RenderError::Launch(
            "Chrome/Chromium not found. Install chromium or set browser.remote_url".to_string(),
        ))
    }

    /// Launch or connect to the browser if not already running.
    async fn ensure_browser(&mut self) -> Result<Arc<Mutex<Browser>>, RenderError> {
        if let Some(ref browser) = self.browser {
            return Ok(browser.clone());
        }

        let browser = match self.config.remote_url.clone() {
            Some(remote_url) => self.connect_remote(&remote_url).await?,
            None => self.launch().await?,
        };

        let browser = Arc::new(Mutex::new(browser));
        self.browser = Some(browser.clone());
        Ok(browser)
    }

    async fn launch(&self) -> Result<Browser, RenderError> {
        info!("Launching browser (headless={})", self.config.headless);

        let chrome_path = Self::find_chrome()?;
        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--no-sandbox") // Often needed for headless in containers
            .arg("--disable-gpu");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(&self, url: &str) -> Result<Browser, RenderError> {
        info!("Connecting to remote browser at {}", url);

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::get(&version_url)
            .await
            .map_err(|e| RenderError::Launch(format!("remote browser unreachable: {}", e)))?
            .text()
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))
            .and_then(|body| {
                serde_json::from_str(&body).map_err(|e| RenderError::Launch(e.to_string()))
            })?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RenderError::Launch("No webSocketDebuggerUrl in response".to_string()))?;

        let (browser, mut handler) = Browser::connect(ws_url)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }

    /// Navigate, wait for the page to settle, and snapshot the DOM.
    async fn render_in(&self, page: &PageGuard, url: &str) -> Result<RenderedPage, RenderError> {
        let navigation_error = |e: chromiumoxide::error::CdpError| RenderError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        };

        page.execute(SetUserAgentOverrideParams::new(self.user_agent.clone()))
            .await
            .map_err(navigation_error)?;

        info!("Rendering {}", url);
        let timeout = self.config.navigation_timeout();
        let navigation = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };
        match tokio::time::timeout(timeout, navigation).await {
            Ok(result) => result.map_err(navigation_error)?,
            Err(_) => {
                return Err(RenderError::Timeout {
                    url: url.to_string(),
                    secs: self.config.timeout,
                })
            }
        }

        match tokio::time::timeout(timeout, page.evaluate(NETWORK_QUIET_SCRIPT.to_string())).await {
            Ok(Ok(result)) => {
                let resources: i64 = result.into_value().unwrap_or(-1);
                if resources < 0 {
                    debug!("Network never went quiet on {}", url);
                } else {
                    debug!("Network quiet on {} after {} resources", url, resources);
                }
            }
            Ok(Err(e)) => debug!("Could not watch network activity on {}: {}", url, e),
            Err(_) => warn!("Timeout waiting for network quiet on {}", url),
        }

        // Heuristic readiness only: late hydration can still be missed.
        tokio::time::sleep(self.config.settle_delay()).await;

        let content_error = |e: chromiumoxide::error::CdpError| RenderError::Content {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let final_url = page
            .url()
            .await
            .map_err(content_error)?
            .unwrap_or_else(|| url.to_string());
        let html = page.content().await.map_err(content_error)?;

        Ok(RenderedPage {
            url: url.to_string(),
            final_url,
            html,
        })
    }

    /// Shut the browser down.
    pub async fn shutdown(&mut self) {
        if let Some(browser) = self.browser.take() {
            let mut browser = browser.lock().await;
            if let Err(e) = browser.close().await {
                debug!("Browser close failed: {}", e);
            }
        }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageRenderer for BrowserFetcher {
    async fn render(&mut self, url: &str) -> Result<RenderedPage, RenderError> {
        let browser = self.ensure_browser().await?;

        let page = {
            let browser = browser.lock().await;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| RenderError::Launch(format!("failed to open tab: {}", e)))?
        };

        let page = PageGuard::new(page, url);
        let result = self.render_in(&page, url).await;
        page.close().await;
        result
    }

    async fn close(&mut self) {
        self.shutdown().await;
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserFetcher;

#[cfg(not(feature = "browser"))]
impl BrowserFetcher {
    pub fn new(_config: BrowserEngineConfig, _user_agent: String) -> Self {
        Self
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl PageRenderer for BrowserFetcher {
    async fn render(&mut self, _url: &str) -> Result<RenderedPage, RenderError> {
        Err(RenderError::BrowserUnavailable)
    }

    async fn close(&mut self) {}
}

//! Extraction run drivers.
//!
//! Both drivers walk the selected candidates strictly in order on the
//! calling task. A page that fails to fetch, render or parse is logged and
//! counted; the run carries on with the next candidate.

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use super::filter::DealPolicy;
use crate::extract::{PageExtraction, RenderedPageExtractor, StructuredDataExtractor};
use crate::models::ProductRecord;
use crate::scrapers::{PageFetcher, PageRenderer, PolitenessGate};

/// Records and per-page outcomes accumulated over one run.
#[derive(Debug, Clone, Default)]
pub struct ExtractionRun {
    /// Every extracted record, in processing order.
    pub records: Vec<ProductRecord>,
    pub pages_processed: usize,
    pub pages_failed: usize,
    pub pages_empty: usize,
    /// Records the last applied deal policy kept.
    pub records_kept: usize,
}

impl ExtractionRun {
    fn record_page(&mut self, url: &str, page: PageExtraction) {
        self.pages_processed += 1;
        match page.path {
            Some(path) => {
                info!("{}: {} products via {}", url, page.records.len(), path);
                self.records.extend(page.records);
            }
            None => {
                debug!("{}: no products", url);
                self.pages_empty += 1;
            }
        }
    }

    fn record_failure(&mut self, url: &str, error: &dyn std::fmt::Display) {
        warn!("{}: {}", url, error);
        self.pages_processed += 1;
        self.pages_failed += 1;
    }

    pub fn records_extracted(&self) -> usize {
        self.records.len()
    }

    /// Records the policy keeps, in processing order.
    pub fn deals(&mut self, policy: DealPolicy) -> Vec<ProductRecord> {
        let deals = policy.apply(&self.records);
        self.records_kept = deals.len();
        deals
    }
}

/// Fetch each page over plain HTTP and extract structured data.
///
/// The fetcher is expected to apply its own politeness gate.
pub async fn run_http_extraction(
    urls: &[String],
    fetcher: &dyn PageFetcher,
    extractor: &StructuredDataExtractor,
    progress: &ProgressBar,
) -> ExtractionRun {
    let mut run = ExtractionRun::default();

    for url in urls {
        progress.set_message(url.clone());
        match fetcher.fetch_text(url).await {
            Ok(html) => run.record_page(url, extractor.extract(&html, url)),
            Err(e) => run.record_failure(url, &e),
        }
        progress.inc(1);
    }

    run
}

/// Render each page in the browser, then extract from the settled DOM.
///
/// The renderer is closed once the run is over, whatever happened to the
/// individual pages.
pub async fn run_rendered_extraction(
    urls: &[String],
    renderer: &mut dyn PageRenderer,
    gate: &PolitenessGate,
    extractor: &RenderedPageExtractor,
    progress: &ProgressBar,
) -> ExtractionRun {
    let mut run = ExtractionRun::default();

    for url in urls {
        progress.set_message(url.clone());
        gate.acquire().await;
        match renderer.render(url).await {
            Ok(page) => {
                if page.final_url != page.url {
                    debug!("{} redirected to {}", page.url, page.final_url);
                }
                run.record_page(url, extractor.extract(&page.html, url));
            }
            Err(e) => run.record_failure(url, &e),
        }
        progress.inc(1);
    }

    renderer.close().await;
    run
}

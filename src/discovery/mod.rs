//! Sale page discovery.
//!
//! Given a storefront domain, proposes URLs likely to be sale or promotion
//! pages by combining three sources: sitemaps, a bounded same-origin crawl,
//! and conventional guessed paths.

mod keywords;
pub mod sources;
pub mod url_utils;

pub use keywords::KeywordMatcher;
pub use sources::default_sources;

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::config::DiscoverySettings;
use crate::scrapers::{PageFetcher, PolitenessGate};

/// Errors that abort a discovery run before any source runs.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Invalid keyword set: {0}")]
    Keywords(#[from] regex::Error),
}

/// What every source gets to work with.
pub struct DiscoveryContext<'a> {
    pub base: Url,
    pub fetcher: &'a dyn PageFetcher,
    pub keywords: &'a KeywordMatcher,
    /// Page cap of the politeness gate guarding `fetcher`.
    pub max_pages: usize,
}

/// A source of candidate sale-page URLs.
#[async_trait]
pub trait DiscoverySource: Send + Sync {
    fn name(&self) -> &str;

    async fn discover(&self, ctx: &DiscoveryContext<'_>) -> Result<Vec<String>, DiscoveryError>;
}

/// Insertion-ordered set of URLs.
#[derive(Debug, Default, Clone)]
pub struct CandidateSet {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl CandidateSet {
    /// Insert a URL, returning false if it was already present.
    pub fn insert(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.order.push(url);
        true
    }

    pub fn extend<I: IntoIterator<Item = String>>(&mut self, urls: I) -> usize {
        urls.into_iter().filter(|u| self.insert(u.clone())).count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

/// Per-source contribution to a discovery run.
#[derive(Debug, Clone)]
pub struct SourceSummary {
    pub source: String,
    pub proposed: usize,
    pub added: usize,
}

/// Result of a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    pub base: Url,
    pub candidates: Vec<String>,
    pub sources: Vec<SourceSummary>,
}

/// Run every source in order against `target` and union their results,
/// preserving first-seen order.
///
/// `gate` is the gate `fetcher` waits on; its page cap bounds the crawl.
pub async fn discover_sale_pages(
    target: &str,
    fetcher: &dyn PageFetcher,
    gate: &PolitenessGate,
    settings: &DiscoverySettings,
) -> Result<DiscoveryReport, DiscoveryError> {
    let base = url_utils::normalize_base_url(target)?;
    let keywords = KeywordMatcher::new(&settings.keywords)?;
    let sources = default_sources(settings);

    let ctx = DiscoveryContext {
        base,
        fetcher,
        keywords: &keywords,
        max_pages: gate.max_pages(),
    };
    run_sources(&ctx, &sources).await
}

/// Run the given sources in order. A failing source is logged and skipped.
pub async fn run_sources(
    ctx: &DiscoveryContext<'_>,
    sources: &[Box<dyn DiscoverySource>],
) -> Result<DiscoveryReport, DiscoveryError> {
    info!("Discovering sale pages on {}", ctx.base);

    let mut candidates = CandidateSet::default();
    let mut summaries = Vec::with_capacity(sources.len());

    for source in sources {
        let urls = match source.discover(ctx).await {
            Ok(urls) => urls,
            Err(e) => {
                warn!("Discovery source {} failed: {}", source.name(), e);
                Vec::new()
            }
        };
        let proposed = urls.len();
        let added = candidates.extend(urls);
        info!(
            "{}: {} proposed, {} new",
            source.name(),
            proposed,
            added
        );
        summaries.push(SourceSummary {
            source: source.name().to_string(),
            proposed,
            added,
        });
    }

    Ok(DiscoveryReport {
        base: ctx.base.clone(),
        candidates: candidates.into_vec(),
        sources: summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MapFetcher;

    #[test]
    fn test_candidate_set_keeps_first_seen_order() {
        let mut set = CandidateSet::default();
        assert!(set.insert("b".into()));
        assert!(set.insert("a".into()));
        assert!(!set.insert("b".into()));
        assert_eq!(set.extend(vec!["c".to_string(), "a".to_string()]), 1);
        assert_eq!(set.into_vec(), vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_discovery_unions_without_duplicates() {
        let fetcher = MapFetcher::new(&[
            (
                "https://shop.example.com/sitemap.xml",
                "<urlset><url><loc>https://shop.example.com/collections/sale</loc></url></urlset>",
            ),
            (
                "https://shop.example.com/",
                r#"<a href="/collections/sale">Sale</a><a href="/pages/outlet">Outlet</a>"#,
            ),
        ]);
        let settings = DiscoverySettings {
            keywords: vec!["sale".into(), "outlet".into()],
            ..DiscoverySettings::default()
        };
        let gate = PolitenessGate::new(settings.politeness());

        let report = discover_sale_pages("shop.example.com", &fetcher, &gate, &settings)
            .await
            .unwrap();

        assert_eq!(
            report.candidates,
            vec![
                "https://shop.example.com/collections/sale",
                "https://shop.example.com/pages/outlet",
                "https://shop.example.com/collections/markdown",
                "https://shop.example.com/pages/promotion",
            ]
        );
        let unique: HashSet<_> = report.candidates.iter().collect();
        assert_eq!(unique.len(), report.candidates.len());
        assert_eq!(report.sources.len(), 3);
        assert_eq!(report.sources[1].added, 1);
    }

    #[tokio::test]
    async fn test_unreachable_site_still_yields_guesses() {
        let fetcher = MapFetcher::new(&[]);
        let settings = DiscoverySettings::default();
        let gate = PolitenessGate::new(settings.politeness());

        let report = discover_sale_pages("https://shop.example.com", &fetcher, &gate, &settings)
            .await
            .unwrap();
        assert_eq!(report.candidates.len(), settings.guessed_paths.len());
    }

    #[tokio::test]
    async fn test_crawl_cap_comes_from_gate() {
        let pages: Vec<(String, String)> = (0..10)
            .map(|i| {
                let url = if i == 0 {
                    "https://shop.example.com/".to_string()
                } else {
                    format!("https://shop.example.com/p/{}", i)
                };
                (url, format!(r#"<a href="/p/{}">next</a>"#, i + 1))
            })
            .collect();
        let refs: Vec<(&str, &str)> = pages.iter().map(|(u, b)| (u.as_str(), b.as_str())).collect();
        let fetcher = MapFetcher::new(&refs);
        let settings = DiscoverySettings {
            sitemap_paths: Vec::new(),
            ..DiscoverySettings::default()
        };

        let gate = PolitenessGate::unthrottled(3);
        discover_sale_pages("shop.example.com", &fetcher, &gate, &settings)
            .await
            .unwrap();

        let crawled = fetcher
            .requests()
            .into_iter()
            .filter(|u| !u.ends_with("robots.txt"))
            .count();
        assert_eq!(crawled, 3);
    }

    #[tokio::test]
    async fn test_invalid_target() {
        let fetcher = MapFetcher::new(&[]);
        let settings = DiscoverySettings::default();
        let gate = PolitenessGate::new(settings.politeness());
        let result = discover_sale_pages("https://", &fetcher, &gate, &settings).await;
        assert!(matches!(result, Err(DiscoveryError::InvalidTarget(_))));
    }
}

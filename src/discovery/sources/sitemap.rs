//! Sitemap and robots.txt discovery source.
//!
//! Reads the `Sitemap:` directives from robots.txt, fetches every known
//! sitemap and keeps the `<loc>` entries that mention a sale keyword.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::discovery::url_utils::{
    extract_robots_sitemap_paths, extract_xml_locs, origin_root, resolve_same_origin,
};
use crate::discovery::{DiscoveryContext, DiscoveryError, DiscoverySource};

/// Upper bound on sitemap documents fetched per run, index children included.
const MAX_SITEMAPS: usize = 50;

/// Discovery source that parses sitemaps and robots.txt.
pub struct SitemapSource {
    default_paths: Vec<String>,
}

impl SitemapSource {
    pub fn new(default_paths: Vec<String>) -> Self {
        Self { default_paths }
    }

    /// Sitemap paths to try: the defaults first, then each robots.txt
    /// directive not already listed.
    pub fn sitemap_paths(&self, robots: Option<&str>) -> Vec<String> {
        let mut seen = HashSet::new();
        let robots_paths = robots.map(extract_robots_sitemap_paths).unwrap_or_default();

        self.default_paths
            .iter()
            .cloned()
            .chain(robots_paths)
            .filter(|p| seen.insert(p.clone()))
            .collect()
    }

    async fn fetch_robots(&self, ctx: &DiscoveryContext<'_>) -> Option<String> {
        let robots_url = origin_root(&ctx.base).join("/robots.txt").ok()?;
        match ctx.fetcher.fetch_text(robots_url.as_str()).await {
            Ok(text) => Some(text),
            Err(e) => {
                debug!("No robots.txt for {}: {}", ctx.base, e);
                None
            }
        }
    }
}

#[async_trait]
impl DiscoverySource for SitemapSource {
    fn name(&self) -> &str {
        "sitemap"
    }

    async fn discover(&self, ctx: &DiscoveryContext<'_>) -> Result<Vec<String>, DiscoveryError> {
        let robots = self.fetch_robots(ctx).await;
        let root = origin_root(&ctx.base);

        let mut pending: VecDeque<String> = self
            .sitemap_paths(robots.as_deref())
            .iter()
            .filter_map(|path| root.join(path).ok())
            .map(|u| u.to_string())
            .collect();
        let mut processed = HashSet::new();
        let mut found = Vec::new();

        while let Some(sitemap_url) = pending.pop_front() {
            if processed.len() >= MAX_SITEMAPS {
                debug!("Sitemap limit reached for {}", ctx.base);
                break;
            }
            if !processed.insert(sitemap_url.clone()) {
                continue;
            }

            debug!("Fetching sitemap: {}", sitemap_url);
            let text = match ctx.fetcher.fetch_text(&sitemap_url).await {
                Ok(text) => text,
                Err(e) => {
                    debug!("Skipping sitemap {}: {}", sitemap_url, e);
                    continue;
                }
            };

            let locs = extract_xml_locs(&text);
            if text.contains("<sitemapindex") {
                for loc in locs {
                    if let Some(child) = resolve_same_origin(&root, &loc) {
                        if !processed.contains(child.as_str()) {
                            pending.push_back(child.to_string());
                        }
                    }
                }
                continue;
            }

            let before = found.len();
            found.extend(locs.into_iter().filter(|loc| ctx.keywords.is_match(loc)));
            debug!(
                "Sitemap {} contributed {} matching URLs",
                sitemap_url,
                found.len() - before
            );
        }

        info!("Sitemaps yielded {} candidate URLs", found.len());
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MapFetcher;
    use crate::discovery::KeywordMatcher;
    use url::Url;

    fn source() -> SitemapSource {
        SitemapSource::new(vec!["/sitemap.xml".into(), "/sitemap_index.xml".into()])
    }

    #[test]
    fn test_sitemap_paths_defaults_then_robots() {
        let robots = "Sitemap: https://shop.example.com/sitemap.xml\nSitemap: https://shop.example.com/kr/sitemap.xml";
        assert_eq!(
            source().sitemap_paths(Some(robots)),
            vec!["/sitemap.xml", "/sitemap_index.xml", "/kr/sitemap.xml"]
        );
    }

    #[test]
    fn test_sitemap_paths_without_robots() {
        assert_eq!(
            source().sitemap_paths(None),
            vec!["/sitemap.xml", "/sitemap_index.xml"]
        );
    }

    #[tokio::test]
    async fn test_keeps_only_keyword_locs() {
        let fetcher = MapFetcher::new(&[(
            "https://shop.example.com/sitemap.xml",
            "<urlset><url><loc>https://shop.example.com/collections/sale</loc></url>\
             <url><loc>https://shop.example.com/about</loc></url></urlset>",
        )]);
        let keywords = KeywordMatcher::new(&["sale"]).unwrap();
        let ctx = DiscoveryContext {
            base: Url::parse("https://shop.example.com/").unwrap(),
            fetcher: &fetcher,
            keywords: &keywords,
            max_pages: 10,
        };

        let found = source().discover(&ctx).await.unwrap();
        assert_eq!(found, vec!["https://shop.example.com/collections/sale"]);
    }

    #[tokio::test]
    async fn test_follows_sitemap_index() {
        let fetcher = MapFetcher::new(&[
            (
                "https://shop.example.com/sitemap_index.xml",
                "<sitemapindex><sitemap><loc>https://shop.example.com/sitemap_pages_1.xml</loc></sitemap>\
                 <sitemap><loc>https://other.example.com/sitemap.xml</loc></sitemap></sitemapindex>",
            ),
            (
                "https://shop.example.com/sitemap_pages_1.xml",
                "<urlset><url><loc>https://shop.example.com/pages/outlet</loc></url></urlset>",
            ),
        ]);
        let keywords = KeywordMatcher::new(&["outlet"]).unwrap();
        let ctx = DiscoveryContext {
            base: Url::parse("https://shop.example.com/").unwrap(),
            fetcher: &fetcher,
            keywords: &keywords,
            max_pages: 10,
        };

        let found = source().discover(&ctx).await.unwrap();
        assert_eq!(found, vec!["https://shop.example.com/pages/outlet"]);
        assert!(!fetcher.was_requested("https://other.example.com/sitemap.xml"));
    }

    #[tokio::test]
    async fn test_all_sitemaps_missing_is_empty() {
        let fetcher = MapFetcher::new(&[]);
        let keywords = KeywordMatcher::new(&["sale"]).unwrap();
        let ctx = DiscoveryContext {
            base: Url::parse("https://shop.example.com/").unwrap(),
            fetcher: &fetcher,
            keywords: &keywords,
            max_pages: 10,
        };

        assert!(source().discover(&ctx).await.unwrap().is_empty());
    }
}

//! Bounded same-origin crawl.
//!
//! Breadth-first from the homepage. A link is recorded when the keyword set
//! matches its resolved URL, its anchor text, or the title of the page it
//! appears on.

use std::collections::{HashSet, VecDeque};
use std::sync::OnceLock;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::discovery::url_utils::{origin_root, resolve_same_origin};
use crate::discovery::{CandidateSet, DiscoveryContext, DiscoveryError, DiscoverySource};

fn anchor_selector() -> &'static Selector {
    static ANCHOR: OnceLock<Selector> = OnceLock::new();
    ANCHOR.get_or_init(|| Selector::parse("a[href]").expect("valid anchor selector"))
}

fn title_selector() -> &'static Selector {
    static TITLE: OnceLock<Selector> = OnceLock::new();
    TITLE.get_or_init(|| Selector::parse("title").expect("valid title selector"))
}

/// A link found on a crawled page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLink {
    pub url: String,
    pub text: String,
}

/// Parse a page, returning its `<title>` and every same-origin link with its
/// anchor text. Hrefs resolve against the origin root.
pub fn extract_page_links(html: &str, root: &url::Url) -> (String, Vec<PageLink>) {
    let document = Html::parse_document(html);

    let title = document
        .select(title_selector())
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let links = document
        .select(anchor_selector())
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let url = resolve_same_origin(root, href)?;
            Some(PageLink {
                url: url.to_string(),
                text: a.text().collect::<String>().trim().to_string(),
            })
        })
        .collect();

    (title, links)
}

/// Discovery source that walks the site's own link graph, visiting at most
/// the context's page cap.
pub struct CrawlSource;

#[async_trait]
impl DiscoverySource for CrawlSource {
    fn name(&self) -> &str {
        "crawl"
    }

    async fn discover(&self, ctx: &DiscoveryContext<'_>) -> Result<Vec<String>, DiscoveryError> {
        let root = origin_root(&ctx.base);
        let mut frontier: VecDeque<String> = VecDeque::from([root.to_string()]);
        let mut visited: HashSet<String> = HashSet::new();
        let mut found = CandidateSet::default();
        let max_pages = ctx.max_pages;

        while visited.len() < max_pages {
            let Some(page_url) = frontier.pop_front() else {
                break;
            };
            if !visited.insert(page_url.clone()) {
                continue;
            }
            if visited.len() % 10 == 0 {
                info!("Crawled {} pages, {} matches so far", visited.len(), found.len());
            }

            let html = match ctx.fetcher.fetch_text(&page_url).await {
                Ok(html) => html,
                Err(e) => {
                    debug!("Skipping {}: {}", page_url, e);
                    continue;
                }
            };

            let (title, links) = extract_page_links(&html, &root);
            for link in links {
                let haystack = format!("{} {} {}", link.url, link.text, title);
                if ctx.keywords.is_match(&haystack) {
                    found.insert(link.url.clone());
                }
                if !visited.contains(&link.url) && frontier.len() < max_pages {
                    frontier.push_back(link.url);
                }
            }
        }

        info!(
            "Crawl visited {} pages and matched {} URLs",
            visited.len(),
            found.len()
        );
        Ok(found.into_vec())
    }
}

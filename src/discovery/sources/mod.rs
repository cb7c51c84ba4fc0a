//! Discovery source implementations.
//!
//! Each source proposes candidate sale-page URLs for a target storefront.

pub mod common_paths;
pub mod crawl;
pub mod sitemap;

pub use common_paths::CommonPathsSource;
pub use crawl::CrawlSource;
pub use sitemap::SitemapSource;

use crate::config::DiscoverySettings;
use crate::discovery::DiscoverySource;

/// The built-in sources in aggregation order: sitemaps, crawl, guesses.
pub fn default_sources(settings: &DiscoverySettings) -> Vec<Box<dyn DiscoverySource>> {
    vec![
        Box::new(SitemapSource::new(settings.sitemap_paths.clone())),
        Box::new(CrawlSource),
        Box::new(CommonPathsSource::new(settings.guessed_paths.clone())),
    ]
}

//! Shared utilities for discovery: target normalization, same-origin checks
//! and `<loc>` extraction.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use super::DiscoveryError;

/// Normalize a target into a base URL with scheme.
///
/// A target carrying an `http://` or `https://` scheme is parsed as-is,
/// anything else (including hosts like `httpbin.org`) gets `https://`.
pub fn normalize_base_url(target: &str) -> Result<Url, DiscoveryError> {
    let target = target.trim();
    let lower = target.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        target.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", target.trim_end_matches('/'))
    };

    let url = Url::parse(&candidate)
        .map_err(|e| DiscoveryError::InvalidTarget(format!("{}: {}", target, e)))?;
    if url.host_str().is_none() {
        return Err(DiscoveryError::InvalidTarget(format!("{}: no host", target)));
    }
    Ok(url)
}

/// Root page of the base URL's origin (`https://host/`).
pub fn origin_root(base: &Url) -> Url {
    let mut root = base.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    root
}

/// Resolve `href` against `base`, keeping it only when it shares the base's
/// scheme, host and port.
pub fn resolve_same_origin(base: &Url, href: &str) -> Option<Url> {
    let resolved = base.join(href.trim()).ok()?;
    (resolved.origin() == base.origin()).then_some(resolved)
}

fn loc_pattern() -> &'static Regex {
    static LOC: OnceLock<Regex> = OnceLock::new();
    LOC.get_or_init(|| Regex::new(r"<loc>(.*?)</loc>").expect("valid loc pattern"))
}

fn robots_sitemap_pattern() -> &'static Regex {
    static SITEMAP: OnceLock<Regex> = OnceLock::new();
    SITEMAP.get_or_init(|| {
        Regex::new(r"(?i)Sitemap:\s*(https?://\S+)").expect("valid sitemap directive pattern")
    })
}

/// Extract all `<loc>` values from sitemap XML by pattern match, unescaping
/// XML entities. Tolerates truncated or otherwise malformed documents.
pub fn extract_xml_locs(xml: &str) -> Vec<String> {
    loc_pattern()
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| unescape_xml(m.as_str().trim()))
        .filter(|loc| !loc.is_empty())
        .collect()
}

/// Extract the path (and query) of every `Sitemap:` directive in robots.txt.
pub fn extract_robots_sitemap_paths(robots: &str) -> Vec<String> {
    robots_sitemap_pattern()
        .captures_iter(robots)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| Url::parse(m.as_str()).ok())
        .map(|u| match u.query() {
            Some(q) => format!("{}?{}", u.path(), q),
            None => u.path().to_string(),
        })
        .collect()
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_base_url_without_scheme() {
        let url = normalize_base_url("www.nike.com").unwrap();
        assert_eq!(url.as_str(), "https://www.nike.com/");
    }

    #[test]
    fn normalize_base_url_with_scheme() {
        let url = normalize_base_url("http://shop.example.com/").unwrap();
        assert_eq!(url.as_str(), "http://shop.example.com/");
    }

    #[test]
    fn normalize_base_url_host_starting_with_http() {
        let url = normalize_base_url("httpbin.org").unwrap();
        assert_eq!(url.as_str(), "https://httpbin.org/");
        let url = normalize_base_url("http-store.kr/").unwrap();
        assert_eq!(url.as_str(), "https://http-store.kr/");
        let url = normalize_base_url("HTTPS://Shop.Example.com").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/");
    }

    #[test]
    fn normalize_base_url_rejects_garbage() {
        assert!(normalize_base_url("https://").is_err());
    }

    #[test]
    fn origin_root_strips_path() {
        let base = Url::parse("https://shop.example.com/kr/w?x=1#top").unwrap();
        assert_eq!(origin_root(&base).as_str(), "https://shop.example.com/");
    }

    #[test]
    fn resolve_same_origin_relative_and_absolute() {
        let base = Url::parse("https://shop.example.com/").unwrap();
        assert_eq!(
            resolve_same_origin(&base, "/collections/sale").unwrap().as_str(),
            "https://shop.example.com/collections/sale"
        );
        assert_eq!(
            resolve_same_origin(&base, "https://shop.example.com/a").unwrap().as_str(),
            "https://shop.example.com/a"
        );
    }

    #[test]
    fn resolve_same_origin_rejects_foreign() {
        let base = Url::parse("https://shop.example.com/").unwrap();
        assert!(resolve_same_origin(&base, "https://cdn.example.com/sale").is_none());
        assert!(resolve_same_origin(&base, "http://shop.example.com/sale").is_none());
        assert!(resolve_same_origin(&base, "https://shop.example.com:8443/sale").is_none());
        assert!(resolve_same_origin(&base, "mailto:sale@example.com").is_none());
        assert!(resolve_same_origin(&base, "javascript:void(0)").is_none());
    }

    #[test]
    fn extract_xml_locs_multiple_per_line() {
        let xml = "<urlset><url><loc>https://a.com/sale</loc></url><url><loc> https://a.com/b </loc></url></urlset>";
        assert_eq!(
            extract_xml_locs(xml),
            vec!["https://a.com/sale", "https://a.com/b"]
        );
    }

    #[test]
    fn extract_xml_locs_truncated_document() {
        let xml = "<urlset><url><loc>https://a.com/outlet</loc></url><url><loc>https://a.com/cut";
        assert_eq!(extract_xml_locs(xml), vec!["https://a.com/outlet"]);
    }

    #[test]
    fn extract_xml_locs_unescapes_entities() {
        let xml = "<url><loc>https://a.com/?q=sale&amp;p=2</loc></url>";
        assert_eq!(extract_xml_locs(xml), vec!["https://a.com/?q=sale&p=2"]);
    }

    #[test]
    fn extract_robots_sitemaps() {
        let robots = "User-agent: *\nDisallow: /cart\nSitemap: https://shop.example.com/sitemap_products_1.xml?from=1\nsitemap: https://shop.example.com/kr/sitemap.xml\n";
        assert_eq!(
            extract_robots_sitemap_paths(robots),
            vec!["/sitemap_products_1.xml?from=1", "/kr/sitemap.xml"]
        );
    }
}

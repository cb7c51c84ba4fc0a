//! Product offer records extracted from sale pages.
//!
//! A [`ProductRecord`] is built once by one of the extractors and never
//! mutated afterwards; the deal filter only keeps or drops it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A normalized product offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Deterministic identifier derived from the offer's identifying fields.
    pub id: String,
    /// Product name.
    pub title: String,
    /// Hostname of the page the offer was found on.
    pub store: String,
    /// Canonical product URL (falls back to the source page).
    pub store_url: String,
    /// Product image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    /// Current selling price. Never negative.
    pub price_now: f64,
    /// Original (pre-discount) price, when known and non-zero.
    #[serde(default)]
    pub price_was: Option<f64>,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Whole-percent discount, present only when `price_was > 0`.
    #[serde(default)]
    pub discount_pct: Option<i64>,
    /// When the offer expires.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Product categories (possibly empty, never a bare scalar).
    #[serde(default)]
    pub category: Vec<String>,
}

impl ProductRecord {
    /// Whether the record carries evidence of a markdown.
    pub fn is_discounted(&self) -> bool {
        self.discount_pct.is_some_and(|pct| pct > 0)
            || self.price_was.is_some_and(|was| was > self.price_now)
    }
}

/// Compute the whole-percent discount of `now` relative to `was`.
///
/// Returns `None` unless `was` is a positive price. Halves round towards
/// positive infinity so that 12.5% reads as 13% and -12.5% as -12%.
pub fn discount_pct(now: f64, was: Option<f64>) -> Option<i64> {
    let was = was.filter(|w| *w > 0.0)?;
    let pct = ((1.0 - now / was) * 100.0 + 0.5).floor();
    pct.is_finite().then_some(pct as i64)
}

/// Hostname of a page URL, or an empty string when it does not parse.
pub fn store_host(page_url: &str) -> String {
    Url::parse(page_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(now: f64, was: Option<f64>) -> ProductRecord {
        ProductRecord {
            id: "sku-1:".to_string(),
            title: "Runner".to_string(),
            store: "shop.example.com".to_string(),
            store_url: "https://shop.example.com/p/1".to_string(),
            img: None,
            price_now: now,
            price_was: was,
            currency: "KRW".to_string(),
            discount_pct: discount_pct(now, was),
            ends_at: None,
            category: Vec::new(),
        }
    }

    #[test]
    fn test_discount_pct_basic() {
        assert_eq!(discount_pct(80.0, Some(100.0)), Some(20));
        assert_eq!(discount_pct(59_000.0, Some(79_000.0)), Some(25));
    }

    #[test]
    fn test_discount_pct_requires_positive_was() {
        assert_eq!(discount_pct(100.0, None), None);
        assert_eq!(discount_pct(100.0, Some(0.0)), None);
        assert_eq!(discount_pct(100.0, Some(-5.0)), None);
    }

    #[test]
    fn test_discount_pct_rounds_half_up() {
        assert_eq!(discount_pct(87.5, Some(100.0)), Some(13));
        assert_eq!(discount_pct(112.5, Some(100.0)), Some(-12));
    }

    #[test]
    fn test_is_discounted() {
        assert!(record(80.0, Some(100.0)).is_discounted());
        assert!(!record(50.0, Some(40.0)).is_discounted());
        assert!(!record(50.0, None).is_discounted());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(record(80.0, Some(100.0))).unwrap();
        assert_eq!(json["discount_pct"], 20);
        assert_eq!(json["category"], serde_json::json!([]));
        assert!(json["ends_at"].is_null());
        assert!(json.get("img").is_none());
    }

    #[test]
    fn test_store_host() {
        assert_eq!(store_host("https://www.nike.com/kr/w/sale"), "www.nike.com");
        assert_eq!(store_host("not a url"), "");
    }
}

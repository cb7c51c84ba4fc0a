//! schema.org Product extraction from JSON-LD blocks.
//!
//! Storefronts ship JSON-LD in every state of repair, so each block goes
//! through a chain of recovery tiers before it is given up on.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use scraper::Html;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::price::coerce_number;
use super::selectors::SelectorList;
use crate::models::{discount_pct, store_host, ProductRecord};

static LD_JSON_SCRIPTS: SelectorList =
    SelectorList::new(&[r#"script[type="application/ld+json"]"#]);

/// Why a Product node could not become a record. Only that node is skipped.
#[derive(Debug, Error, PartialEq)]
pub enum MappingError {
    #[error("product has no name")]
    MissingName,

    #[error("product has negative price {0}")]
    NegativePrice(f64),
}

type RecoveryTier = fn(&str) -> Option<Value>;

/// Parse attempts per block, in order. First success wins.
const RECOVERY_TIERS: &[(&str, RecoveryTier)] = &[
    ("raw", parse_raw),
    ("brace-span", parse_brace_span),
    ("entity-unescape", parse_unescaped),
];

fn parse_raw(text: &str) -> Option<Value> {
    serde_json::from_str(text.trim()).ok()
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn parse_brace_span(text: &str) -> Option<Value> {
    serde_json::from_str(brace_span(text)?).ok()
}

fn parse_unescaped(text: &str) -> Option<Value> {
    let span = brace_span(text).unwrap_or(text);
    let unescaped = span
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&amp;", "&");
    serde_json::from_str(unescaped.trim()).ok()
}

/// Parse one JSON-LD block, returning the value and the tier that produced it.
pub fn parse_block(text: &str) -> Option<(Value, &'static str)> {
    RECOVERY_TIERS
        .iter()
        .find_map(|(name, tier)| tier(text).map(|v| (v, *name)))
}

/// The shapes a parsed JSON-LD block takes.
#[derive(Debug)]
pub enum LdShape {
    /// A single node object.
    Node(Map<String, Value>),
    /// A top-level array of nodes or further shapes.
    List(Vec<Value>),
    /// An object whose `@graph` array replaces it.
    Graph(Vec<Value>),
    /// Anything else (a bare string, number, ...).
    Scalar,
}

impl LdShape {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => LdShape::List(items),
            Value::Object(mut map) => match map.remove("@graph") {
                Some(Value::Array(items)) => LdShape::Graph(items),
                Some(single @ Value::Object(_)) => LdShape::Graph(vec![single]),
                Some(other) => {
                    map.insert("@graph".to_string(), other);
                    LdShape::Node(map)
                }
                None => LdShape::Node(map),
            },
            _ => LdShape::Scalar,
        }
    }

    /// Flatten into candidate node objects in document order.
    pub fn into_candidates(self) -> Vec<Map<String, Value>> {
        match self {
            LdShape::Node(map) => vec![map],
            LdShape::List(items) => items
                .into_iter()
                .flat_map(|item| LdShape::from_value(item).into_candidates())
                .collect(),
            LdShape::Graph(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
            LdShape::Scalar => Vec::new(),
        }
    }
}

/// `@type` as an array, whether given as a string or a list.
pub fn node_types(node: &Map<String, Value>) -> Vec<String> {
    match node.get("@type") {
        Some(Value::String(t)) => vec![t.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|t| t.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

pub fn is_product(node: &Map<String, Value>) -> bool {
    node_types(node).iter().any(|t| t == "Product")
}

/// Non-empty string, or a number rendered as text.
fn text_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_offer(node: &Map<String, Value>) -> Option<&Map<String, Value>> {
    match node.get("offers")? {
        Value::Array(items) => items.first()?.as_object(),
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn image_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => image_of(items.first()),
        Value::Object(map) => text_of(map.get("url")),
        _ => None,
    }
}

fn categories_of(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// `priceValidUntil` as RFC 3339, or a bare date meaning the end of that day.
pub fn parse_valid_until(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let end_of_day = date.and_hms_opt(23, 59, 59)?;
    Some(Utc.from_utc_datetime(&end_of_day))
}

/// Map a Product node to a record.
pub fn map_product(
    node: &Map<String, Value>,
    source_url: &str,
    default_currency: &str,
) -> Result<ProductRecord, MappingError> {
    let title = text_of(node.get("name")).ok_or(MappingError::MissingName)?;
    let offer = first_offer(node);
    let offer_field = |key: &str| offer.and_then(|o| o.get(key));

    let price_now = offer_field("price").and_then(coerce_number).unwrap_or(0.0);
    if price_now < 0.0 {
        return Err(MappingError::NegativePrice(price_now));
    }

    let price_was = offer
        .and_then(|o| o.get("priceSpecification"))
        .and_then(|spec| spec.get("price"))
        .and_then(coerce_number)
        .filter(|was| *was != 0.0);

    let ident = text_of(node.get("sku"))
        .or_else(|| text_of(node.get("name")))
        .or_else(|| text_of(node.get("url")))
        .unwrap_or_else(|| source_url.to_string());
    let offer_sku = text_of(offer_field("sku")).unwrap_or_default();

    let currency = text_of(offer_field("priceCurrency"))
        .unwrap_or_else(|| default_currency.to_string());

    let ends_at = offer_field("priceValidUntil")
        .and_then(Value::as_str)
        .and_then(parse_valid_until);

    Ok(ProductRecord {
        id: format!("{}:{}", ident, offer_sku),
        title,
        store: store_host(source_url),
        store_url: text_of(node.get("url")).unwrap_or_else(|| source_url.to_string()),
        img: image_of(node.get("image")),
        price_now,
        price_was,
        currency,
        discount_pct: discount_pct(price_now, price_was),
        ends_at,
        category: categories_of(node.get("category")),
    })
}

/// Extract every Product record from the JSON-LD blocks of a document.
pub fn extract_jsonld(
    document: &Html,
    source_url: &str,
    default_currency: &str,
) -> Vec<ProductRecord> {
    let mut records = Vec::new();
    for (index, script) in LD_JSON_SCRIPTS.all(document).enumerate() {
        let text = script.text().collect::<String>();
        if text.trim().is_empty() {
            continue;
        }

        let Some((value, tier)) = parse_block(&text) else {
            debug!("Skipping unparseable JSON-LD block {} on {}", index, source_url);
            continue;
        };
        if tier != "raw" {
            debug!("JSON-LD block {} on {} recovered via {}", index, source_url, tier);
        }

        for node in LdShape::from_value(value).into_candidates() {
            if !is_product(&node) {
                continue;
            }
            match map_product(&node, source_url, default_currency) {
                Ok(record) => records.push(record),
                Err(e) => debug!("Skipping product on {}: {}", source_url, e),
            }
        }
    }
    records
}

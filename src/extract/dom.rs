//! Heuristic product extraction from a rendered DOM snapshot.
//!
//! Used when a client-rendered page exposes no structured data. Each field
//! is resolved by an ordered chain of strategies; the price chain fills the
//! current and original price independently, so a later strategy only
//! contributes what earlier ones left unresolved. The (current, original)
//! reading of a two-price element and the currency guess are best-effort.

use scraper::{ElementRef, Html};
use tracing::debug;

use super::price::{first_price_token, infer_currency, parse_price, price_tokens};
use super::selectors::SelectorList;
use crate::models::{discount_pct, store_host, ProductRecord};

static TITLE_SELECTORS: SelectorList = SelectorList::new(&[
    "h1#pdp_product_title",
    r#"h1[data-test*="product"]"#,
    "h1",
]);

static PRODUCT_PRICE: SelectorList = SelectorList::new(&[r#"[data-test="product-price"]"#]);

static REDUCED_PRICE_SELECTORS: SelectorList = SelectorList::new(&[
    r#"[data-test="product-price-reduced"]"#,
    r#"[data-test="product-price-reduced-price"]"#,
]);

static STRUCK_PRICE_SELECTORS: SelectorList = SelectorList::new(&[
    r#"[class*="full-price"]"#,
    r#"[class*="strikethrough"]"#,
    r#"[class*="was-price"]"#,
    r#"[class*="original-price"]"#,
    r#"s[class*="price"]"#,
    r#"del[class*="price"]"#,
]);

static SALE_INDICATORS: SelectorList =
    SelectorList::new(&[r#"[class*="sale"], [class*="discount"], [data-test*="sale"]"#]);

static GENERIC_PRICE_SELECTORS: SelectorList = SelectorList::new(&[
    ".product-price",
    r#"[class*="product-price"]"#,
    r#"[class*="currentPrice"]"#,
    r#"[class*="ProductPrice"]"#,
    r#"div[class*="price"] span"#,
]);

static PRODUCT_IMAGE: SelectorList = SelectorList::new(&[r#"img[data-test*="product"]"#]);
static PICTURE_IMAGE: SelectorList = SelectorList::new(&["picture img"]);
static OG_IMAGE: SelectorList = SelectorList::new(&[r#"meta[property="og:image"]"#]);

/// One step of the extraction trace.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub strategy: &'static str,
    pub detail: String,
}

type Trace = Vec<TraceEntry>;

fn note(trace: &mut Trace, strategy: &'static str, detail: impl Into<String>) {
    trace.push(TraceEntry {
        strategy,
        detail: detail.into(),
    });
}

/// Raw price tokens, separators already stripped.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PricePair {
    pub now: Option<String>,
    pub was: Option<String>,
}

impl PricePair {
    fn merge(&mut self, found: PricePair) {
        if self.now.is_none() {
            self.now = found.now;
        }
        if self.was.is_none() {
            self.was = found.was;
        }
    }
}

struct PriceStrategy {
    name: &'static str,
    wants: fn(&PricePair) -> bool,
    run: fn(&Html, &mut Trace) -> Option<PricePair>,
}

fn always(_: &PricePair) -> bool {
    true
}

fn missing_was(p: &PricePair) -> bool {
    p.was.is_none()
}

fn missing_now(p: &PricePair) -> bool {
    p.now.is_none()
}

const PRICE_STRATEGIES: &[PriceStrategy] = &[
    PriceStrategy {
        name: "product-price",
        wants: always,
        run: product_price_element,
    },
    PriceStrategy {
        name: "reduced-price",
        wants: missing_was,
        run: reduced_price_element,
    },
    PriceStrategy {
        name: "struck-price",
        wants: missing_was,
        run: struck_price_element,
    },
    PriceStrategy {
        name: "sale-indicator",
        wants: missing_was,
        run: sale_indicator_parent,
    },
    PriceStrategy {
        name: "generic-price",
        wants: missing_now,
        run: generic_price_container,
    },
];

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// `[data-test="product-price"]`: two tokens read as (current, original).
fn product_price_element(document: &Html, trace: &mut Trace) -> Option<PricePair> {
    let Some(element) = PRODUCT_PRICE.first(document) else {
        note(trace, "product-price", "not found");
        return None;
    };
    let text = text_of(element);
    note(trace, "product-price", text.trim());

    let mut tokens = price_tokens(&text).into_iter();
    let now = tokens.next()?;
    Some(PricePair {
        now: Some(now),
        was: tokens.next(),
    })
}

/// Dedicated reduced-price element supplies the original price.
fn reduced_price_element(document: &Html, trace: &mut Trace) -> Option<PricePair> {
    let element = REDUCED_PRICE_SELECTORS.first(document)?;
    let text = text_of(element);
    note(trace, "reduced-price", text.trim());

    Some(PricePair {
        now: None,
        was: Some(first_price_token(&text)?),
    })
}

/// Struck-through or "original price" styling supplies the original price.
fn struck_price_element(document: &Html, trace: &mut Trace) -> Option<PricePair> {
    for (css, selector) in STRUCK_PRICE_SELECTORS.iter() {
        let Some(element) = document.select(selector).next() else {
            continue;
        };
        let text = text_of(element);
        note(trace, "struck-price", format!("{} -> {}", css, text.trim()));
        if let Some(was) = first_price_token(&text) {
            return Some(PricePair {
                now: None,
                was: Some(was),
            });
        }
    }
    None
}

/// A sale or discount badge usually sits next to both prices: the first
/// parent holding two tokens gives (current, original).
fn sale_indicator_parent(document: &Html, trace: &mut Trace) -> Option<PricePair> {
    for indicator in SALE_INDICATORS.all(document) {
        let Some(parent) = indicator.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        let text = text_of(parent);
        let tokens = price_tokens(&text);
        if tokens.len() > 1 {
            note(trace, "sale-indicator", text.trim());
            let mut tokens = tokens.into_iter();
            return Some(PricePair {
                now: tokens.next(),
                was: tokens.next(),
            });
        }
    }
    None
}

/// Generic price containers supply the current price.
fn generic_price_container(document: &Html, trace: &mut Trace) -> Option<PricePair> {
    for (css, selector) in GENERIC_PRICE_SELECTORS.iter() {
        let Some(element) = document.select(selector).next() else {
            continue;
        };
        let text = text_of(element);
        note(trace, "generic-price", format!("{} -> {}", css, text.trim()));
        if let Some(now) = first_price_token(&text) {
            return Some(PricePair {
                now: Some(now),
                was: None,
            });
        }
    }
    None
}

fn find_title(document: &Html) -> Option<String> {
    TITLE_SELECTORS.iter().find_map(|(_, selector)| {
        let title = text_of(document.select(selector).next()?);
        let title = title.trim();
        (!title.is_empty()).then(|| title.to_string())
    })
}

fn find_image(document: &Html) -> Option<String> {
    let attr = |list: &'static SelectorList, name: &str| {
        list.first(document)
            .and_then(|e| e.value().attr(name))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    attr(&PRODUCT_IMAGE, "src")
        .or_else(|| attr(&PICTURE_IMAGE, "src"))
        .or_else(|| attr(&OG_IMAGE, "content"))
}

/// Everything the heuristics found on a page, before validation.
#[derive(Debug, Clone, Default)]
pub struct DomFindings {
    pub title: Option<String>,
    pub prices: PricePair,
    pub img: Option<String>,
    pub trace: Vec<TraceEntry>,
}

/// Extracts at most one product from a rendered page by DOM heuristics.
#[derive(Debug, Clone)]
pub struct HeuristicDomExtractor {
    decimal_currency: String,
    integer_currency: String,
}

impl HeuristicDomExtractor {
    pub fn new(decimal_currency: impl Into<String>, integer_currency: impl Into<String>) -> Self {
        Self {
            decimal_currency: decimal_currency.into(),
            integer_currency: integer_currency.into(),
        }
    }

    /// Run every strategy chain without deciding whether a record results.
    pub fn inspect(&self, document: &Html) -> DomFindings {
        let mut findings = DomFindings {
            title: find_title(document),
            ..DomFindings::default()
        };

        for strategy in PRICE_STRATEGIES {
            if !(strategy.wants)(&findings.prices) {
                continue;
            }
            if let Some(found) = (strategy.run)(document, &mut findings.trace) {
                debug!(
                    "{} resolved now={:?} was={:?}",
                    strategy.name, found.now, found.was
                );
                findings.prices.merge(found);
            }
        }

        findings.img = find_image(document);
        findings
    }

    /// Build a record when the page has a title and a positive current price.
    pub fn extract(&self, document: &Html, source_url: &str) -> Option<ProductRecord> {
        let findings = self.inspect(document);
        for entry in &findings.trace {
            debug!("[{}] {}: {}", source_url, entry.strategy, entry.detail);
        }

        let title = findings.title?;
        let now_raw = findings.prices.now?;
        let price_now = parse_price(&now_raw).filter(|p| *p > 0.0)?;
        let price_was = findings
            .prices
            .was
            .as_deref()
            .and_then(parse_price)
            .filter(|p| *p > 0.0);

        Some(ProductRecord {
            id: source_url.to_string(),
            title,
            store: store_host(source_url),
            store_url: source_url.to_string(),
            img: findings.img,
            price_now,
            price_was,
            currency: infer_currency(&now_raw, &self.decimal_currency, &self.integer_currency),
            discount_pct: discount_pct(price_now, price_was),
            ends_at: None,
            category: Vec::new(),
        })
    }
}

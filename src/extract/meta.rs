//! Meta-tag fallback for pages without JSON-LD products.

use scraper::{ElementRef, Html, Selector};

use super::price::{first_price_token, parse_price};
use super::selectors::SelectorList;
use crate::models::{store_host, ProductRecord};

static TITLE_META: SelectorList = SelectorList::new(&[
    r#"meta[property="og:title"]"#,
    r#"meta[property="product:title"]"#,
    r#"meta[name="twitter:title"]"#,
]);

static HEADING: SelectorList = SelectorList::new(&["h1"]);

static OG_IMAGE: SelectorList = SelectorList::new(&[r#"meta[property="og:image"]"#]);

static PRICE_SOURCES: SelectorList = SelectorList::new(&[
    r#"meta[property="og:price:amount"]"#,
    r#"meta[property="product:price:amount"]"#,
    r#"[itemprop="price"]"#,
    "[data-price]",
]);

static CURRENCY_META: SelectorList = SelectorList::new(&[
    r#"meta[property="og:price:currency"]"#,
    r#"meta[property="product:price:currency"]"#,
    r#"[itemprop="priceCurrency"]"#,
]);

fn first_match<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).next()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The value an element carries: `content`, then `data-price`, then its text.
fn element_value(element: ElementRef<'_>) -> Option<String> {
    non_empty(element.value().attr("content"))
        .or_else(|| non_empty(element.value().attr("data-price")))
        .or_else(|| non_empty(Some(element.text().collect::<String>().as_str())))
}

fn meta_title(document: &Html) -> Option<String> {
    TITLE_META
        .iter()
        .find_map(|(_, selector)| {
            first_match(document, selector).and_then(|m| non_empty(m.value().attr("content")))
        })
        .or_else(|| {
            let h1 = HEADING.first(document)?;
            non_empty(Some(h1.text().collect::<String>().as_str()))
        })
}

fn meta_price(document: &Html) -> Option<f64> {
    PRICE_SOURCES.iter().find_map(|(_, selector)| {
        let raw = first_match(document, selector).and_then(element_value)?;
        parse_price(&first_price_token(&raw)?)
    })
}

fn meta_currency(document: &Html) -> Option<String> {
    CURRENCY_META
        .iter()
        .find_map(|(_, selector)| first_match(document, selector).and_then(element_value))
}

/// Build one record from page metadata, or none without a title and a
/// positive price.
pub fn extract_meta(
    document: &Html,
    source_url: &str,
    default_currency: &str,
) -> Option<ProductRecord> {
    let title = meta_title(document)?;
    let price_now = meta_price(document).filter(|p| *p > 0.0)?;

    let img = OG_IMAGE
        .first(document)
        .and_then(|m| non_empty(m.value().attr("content")));

    Some(ProductRecord {
        id: source_url.to_string(),
        title,
        store: store_host(source_url),
        store_url: source_url.to_string(),
        img,
        price_now,
        price_was: None,
        currency: meta_currency(document).unwrap_or_else(|| default_currency.to_string()),
        discount_pct: None,
        ends_at: None,
        category: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://shop.example.com/products/shoe";

    #[test]
    fn test_og_tags() {
        let html = Html::parse_document(
            r#"<head>
                <meta property="og:title" content="Shoe">
                <meta property="og:price:amount" content="59.99">
                <meta property="og:image" content="https://cdn.example.com/shoe.jpg">
            </head>"#,
        );
        let record = extract_meta(&html, URL, "KRW").unwrap();
        assert_eq!(record.title, "Shoe");
        assert_eq!(record.price_now, 59.99);
        assert_eq!(record.price_was, None);
        assert_eq!(record.discount_pct, None);
        assert_eq!(record.currency, "KRW");
        assert_eq!(record.id, URL);
        assert_eq!(record.img.as_deref(), Some("https://cdn.example.com/shoe.jpg"));
    }

    #[test]
    fn test_h1_and_itemprop_fallbacks() {
        let html = Html::parse_document(
            r#"<body><h1> Wool Coat </h1>
               <span itemprop="price">₩129,000</span>
               <meta itemprop="priceCurrency" content="KRW"></body>"#,
        );
        let record = extract_meta(&html, URL, "USD").unwrap();
        assert_eq!(record.title, "Wool Coat");
        assert_eq!(record.price_now, 129000.0);
        assert_eq!(record.currency, "KRW");
        assert!(record.img.is_none());
    }

    #[test]
    fn test_data_price_attribute() {
        let html = Html::parse_document(r#"<h1>Cap</h1><div data-price="15000"></div>"#);
        assert_eq!(extract_meta(&html, URL, "KRW").unwrap().price_now, 15000.0);
    }

    #[test]
    fn test_requires_title_and_positive_price() {
        let no_price = Html::parse_document(r#"<meta property="og:title" content="Shoe">"#);
        assert!(extract_meta(&no_price, URL, "KRW").is_none());

        let zero = Html::parse_document(
            r#"<meta property="og:title" content="Shoe"><meta property="og:price:amount" content="0">"#,
        );
        assert!(extract_meta(&zero, URL, "KRW").is_none());

        let no_title = Html::parse_document(r#"<meta property="og:price:amount" content="10">"#);
        assert!(extract_meta(&no_title, URL, "KRW").is_none());
    }
}

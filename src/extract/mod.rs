//! Product extraction from page HTML.
//!
//! Structured data is tried first: JSON-LD Products, then page metadata.
//! Rendered pages that yield neither fall back to DOM heuristics.

pub mod dom;
pub mod jsonld;
mod meta;
pub mod price;
mod selectors;

pub use dom::HeuristicDomExtractor;
pub use jsonld::MappingError;

use scraper::Html;

use crate::config::ExtractionSettings;
use crate::models::ProductRecord;

/// Which extractor produced a page's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPath {
    JsonLd,
    MetaTags,
    DomHeuristics,
}

impl std::fmt::Display for ExtractionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExtractionPath::JsonLd => "json-ld",
            ExtractionPath::MetaTags => "meta tags",
            ExtractionPath::DomHeuristics => "dom heuristics",
        };
        f.write_str(name)
    }
}

/// Records found on one page. An empty page is a miss, not an error.
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    pub path: Option<ExtractionPath>,
    pub records: Vec<ProductRecord>,
}

impl PageExtraction {
    fn from_records(path: ExtractionPath, records: Vec<ProductRecord>) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        Self {
            path: Some(path),
            records,
        }
    }

    pub fn is_miss(&self) -> bool {
        self.records.is_empty()
    }
}

/// JSON-LD extraction with the meta-tag fallback.
#[derive(Debug, Clone)]
pub struct StructuredDataExtractor {
    default_currency: String,
}

impl StructuredDataExtractor {
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self {
            default_currency: default_currency.into(),
        }
    }

    pub fn extract(&self, html: &str, source_url: &str) -> PageExtraction {
        self.extract_document(&Html::parse_document(html), source_url)
    }

    pub fn extract_document(&self, document: &Html, source_url: &str) -> PageExtraction {
        let products = jsonld::extract_jsonld(document, source_url, &self.default_currency);
        if !products.is_empty() {
            return PageExtraction::from_records(ExtractionPath::JsonLd, products);
        }

        let fallback = meta::extract_meta(document, source_url, &self.default_currency);
        PageExtraction::from_records(ExtractionPath::MetaTags, fallback.into_iter().collect())
    }
}

/// Structured extraction, then DOM heuristics, for rendered snapshots.
#[derive(Debug, Clone)]
pub struct RenderedPageExtractor {
    structured: StructuredDataExtractor,
    heuristics: HeuristicDomExtractor,
}

impl RenderedPageExtractor {
    pub fn new(structured: StructuredDataExtractor, heuristics: HeuristicDomExtractor) -> Self {
        Self {
            structured,
            heuristics,
        }
    }

    pub fn from_settings(settings: &ExtractionSettings) -> Self {
        Self::new(
            StructuredDataExtractor::new(&settings.default_currency),
            HeuristicDomExtractor::new(&settings.decimal_currency, &settings.integer_currency),
        )
    }

    pub fn extract(&self, html: &str, source_url: &str) -> PageExtraction {
        let document = Html::parse_document(html);
        let structured = self.structured.extract_document(&document, source_url);
        if !structured.is_miss() {
            return structured;
        }

        let guessed = self.heuristics.extract(&document, source_url);
        PageExtraction::from_records(ExtractionPath::DomHeuristics, guessed.into_iter().collect())
    }
}

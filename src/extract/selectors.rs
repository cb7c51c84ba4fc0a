//! Built-in CSS selector tables, compiled once on first use.

use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

/// An ordered list of fixed selectors.
pub struct SelectorList {
    css: &'static [&'static str],
    compiled: OnceLock<Vec<Selector>>,
}

impl SelectorList {
    pub const fn new(css: &'static [&'static str]) -> Self {
        Self {
            css,
            compiled: OnceLock::new(),
        }
    }

    /// Each selector with the text it was compiled from, in order.
    pub fn iter(&'static self) -> impl Iterator<Item = (&'static str, &'static Selector)> {
        let compiled = self.compiled.get_or_init(|| {
            self.css
                .iter()
                .map(|css| Selector::parse(css).expect("valid built-in selector"))
                .collect()
        });
        self.css.iter().copied().zip(compiled.iter())
    }

    /// First element matched by the earliest selector that matches anything.
    pub fn first<'a>(&'static self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.iter().find_map(|(_, selector)| document.select(selector).next())
    }

    /// Every match of every selector, selector by selector.
    pub fn all<'a>(&'static self, document: &'a Html) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.iter().flat_map(move |(_, selector)| document.select(selector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static PRICES: SelectorList = SelectorList::new(&[".missing", ".was", ".now"]);

    #[test]
    fn test_first_prefers_earlier_selector() {
        let html = Html::parse_document(r#"<p class="now">1</p><p class="was">2</p>"#);
        let first = PRICES.first(&html).unwrap();
        assert_eq!(first.text().collect::<String>(), "2");
    }

    #[test]
    fn test_all_walks_selectors_in_order() {
        let html = Html::parse_document(r#"<p class="now">1</p><p class="was">2</p>"#);
        let texts: Vec<String> = PRICES.all(&html).map(|e| e.text().collect()).collect();
        assert_eq!(texts, vec!["2", "1"]);
    }

    #[test]
    fn test_compiled_once() {
        let a = PRICES.iter().next().unwrap().1 as *const Selector;
        let b = PRICES.iter().next().unwrap().1 as *const Selector;
        assert_eq!(a, b);
    }
}

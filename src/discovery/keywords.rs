//! Sale keyword matching.

use regex::{Regex, RegexBuilder};

/// Case-insensitive matcher over a configured keyword set.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    pattern: Option<Regex>,
}

impl KeywordMatcher {
    /// Build a matcher. Keywords are matched literally, anywhere in the text.
    /// An empty keyword set matches nothing.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&format!("(?:{})", alternatives.join("|")))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> KeywordMatcher {
        KeywordMatcher::new(&["sale", "clearance", "세일", "c++"]).unwrap()
    }

    #[test]
    fn test_case_insensitive() {
        let m = matcher();
        assert!(m.is_match("https://shop.example.com/collections/SALE"));
        assert!(m.is_match("Winter Clearance"));
        assert!(!m.is_match("https://shop.example.com/collections/new"));
    }

    #[test]
    fn test_localized_keywords() {
        assert!(matcher().is_match("https://shop.example.kr/pages/겨울세일"));
    }

    #[test]
    fn test_keywords_are_literal() {
        let m = matcher();
        assert!(m.is_match("learn c++ today"));
        assert!(!m.is_match("learn cc today"));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let m = KeywordMatcher::new::<&str>(&[]).unwrap();
        assert!(!m.is_match("sale"));
    }
}

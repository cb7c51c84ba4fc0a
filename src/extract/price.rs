//! Price token parsing and numeric coercion.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid price token pattern"))
}

/// Numeric tokens in display text, thousands separators stripped.
///
/// `"₩50,000 ₩100,000"` yields `["50000", "100000"]`.
pub fn price_tokens(text: &str) -> Vec<String> {
    token_pattern()
        .find_iter(text)
        .map(|m| m.as_str().replace(',', ""))
        .collect()
}

/// First numeric token in `text`, separators stripped.
pub fn first_price_token(text: &str) -> Option<String> {
    token_pattern()
        .find(text)
        .map(|m| m.as_str().replace(',', ""))
}

/// Parse a stripped token into a finite number.
pub fn parse_price(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Coerce a JSON value to a number.
///
/// Numbers pass through, an empty (or blank) string is 0, any other string
/// must parse as a float. Everything else is not numeric.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0.0)
            } else {
                parse_price(s)
            }
        }
        _ => None,
    }
}

/// Best-effort currency guess for a DOM price: a decimal point suggests the
/// decimal currency, otherwise the integer currency.
pub fn infer_currency(raw_price: &str, decimal: &str, integer: &str) -> String {
    if raw_price.contains('.') {
        decimal.to_string()
    } else {
        integer.to_string()
    }
}

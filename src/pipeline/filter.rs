//! Deal predicates.

use serde::{Deserialize, Serialize};

use crate::models::ProductRecord;

/// Which extracted records count as deals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DealPolicy {
    /// Only records with evidence of a markdown.
    Discounted,
    /// Any record with a positive price. Candidates already come from sale
    /// pages, so a priced product is taken to be on sale.
    Priced,
}

impl DealPolicy {
    pub fn keeps(&self, record: &ProductRecord) -> bool {
        match self {
            DealPolicy::Discounted => record.is_discounted(),
            DealPolicy::Priced => record.price_now > 0.0,
        }
    }

    /// Keep matching records in their original order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<ProductRecord>
    where
        I: IntoIterator<Item = &'a ProductRecord>,
    {
        records
            .into_iter()
            .filter(|r| self.keeps(r))
            .cloned()
            .collect()
    }
}

impl std::fmt::Display for DealPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DealPolicy::Discounted => f.write_str("discounted"),
            DealPolicy::Priced => f.write_str("priced"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::discount_pct;

    fn record(now: f64, was: Option<f64>) -> ProductRecord {
        ProductRecord {
            id: format!("{}:", now),
            title: "Item".into(),
            store: "shop.example.com".into(),
            store_url: "https://shop.example.com/p".into(),
            img: None,
            price_now: now,
            price_was: was,
            currency: "KRW".into(),
            discount_pct: discount_pct(now, was),
            ends_at: None,
            category: vec![],
        }
    }

    #[test]
    fn test_discounted_policy() {
        let policy = DealPolicy::Discounted;
        assert!(policy.keeps(&record(80.0, Some(100.0))));
        assert!(!policy.keeps(&record(50.0, Some(40.0))));
        assert!(!policy.keeps(&record(50.0, None)));
        assert!(!policy.keeps(&record(100.0, Some(100.0))));
    }

    #[test]
    fn test_priced_policy() {
        let policy = DealPolicy::Priced;
        assert!(policy.keeps(&record(50.0, None)));
        assert!(policy.keeps(&record(50.0, Some(40.0))));
        assert!(!policy.keeps(&record(0.0, Some(40.0))));
    }

    #[test]
    fn test_apply_preserves_order() {
        let records = vec![
            record(80.0, Some(100.0)),
            record(50.0, None),
            record(30.0, Some(60.0)),
        ];
        let kept = DealPolicy::Discounted.apply(&records);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].price_now, 80.0);
        assert_eq!(kept[1].price_now, 30.0);
    }

    #[test]
    fn test_policy_deserializes_snake_case() {
        #[derive(Deserialize)]
        struct Holder {
            policy: DealPolicy,
        }
        let h: Holder = toml::from_str(r#"policy = "priced""#).unwrap();
        assert_eq!(h.policy, DealPolicy::Priced);
    }
}

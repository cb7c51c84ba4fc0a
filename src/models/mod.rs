//! Data models for dealscout.

mod product;

pub use product::{discount_pct, store_host, ProductRecord};

//! dealscout - sale page discovery and discount extraction for storefronts.
//!
//! Three stages hand off through JSON artifacts: discovery proposes sale
//! pages for a domain, extraction pulls product offers out of those pages
//! (over plain HTTP or through a headless browser), and the deal filter
//! writes the offers worth showing.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod scrapers;

#[cfg(test)]
mod test_support;

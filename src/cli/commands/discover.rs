//! Sale page discovery command.

use std::path::PathBuf;

use anyhow::Context;
use console::style;

use super::super::helpers::{spinner, truncate};
use crate::config::Settings;
use crate::discovery::discover_sale_pages;
use crate::pipeline::artifact;
use crate::scrapers::{HttpClient, PolitenessGate};

/// Discover candidate sale pages on a storefront and write the artifact.
pub async fn cmd_discover(
    settings: &Settings,
    domain: &str,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let gate = PolitenessGate::new(settings.discovery.politeness());
    let client = HttpClient::new(
        settings.network.timeout(),
        gate,
        settings.network.user_agent.as_deref(),
    )
    .context("Failed to build HTTP client")?;

    println!(
        "{} Discovering sale pages on {} (crawl cap {} pages)",
        style("→").cyan(),
        domain,
        client.gate().max_pages()
    );

    let pb = spinner("Reading sitemaps and crawling...");
    let report = discover_sale_pages(domain, &client, client.gate(), &settings.discovery)
        .await
        .with_context(|| format!("Discovery failed for {}", domain))?;
    pb.finish_and_clear();

    let out = out.unwrap_or_else(|| settings.paths.discovery.clone());
    artifact::write_candidates(&out, &report.candidates)
        .with_context(|| format!("Failed to write discovery artifact {}", out.display()))?;

    println!("\n{}", style(format!("Discovery: {}", report.base)).bold());
    println!("{}", "-".repeat(40));
    for source in &report.sources {
        println!(
            "  {:<14} {:>4} proposed, {:>4} new",
            source.source, source.proposed, source.added
        );
    }
    for url in report.candidates.iter().take(10) {
        println!("  {} {}", style("•").dim(), truncate(url, 100));
    }
    if report.candidates.len() > 10 {
        println!("  {} and {} more", style("…").dim(), report.candidates.len() - 10);
    }

    println!(
        "\n{} Saved {} candidate URLs to {} ({} requests)",
        style("✓").green(),
        report.candidates.len(),
        out.display(),
        client.gate().total_requests().await
    );

    Ok(())
}

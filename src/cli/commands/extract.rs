//! Extraction commands (`extract` and `render`).

use anyhow::Context;
use console::style;

use super::super::helpers::{page_bar, print_run_summary};
use super::ExtractArgs;
use crate::config::{ProfileSettings, Settings};
use crate::extract::{RenderedPageExtractor, StructuredDataExtractor};
use crate::pipeline::{
    artifact, run_http_extraction, run_rendered_extraction, DealPolicy, RunScope,
};
use crate::scrapers::{resolve_user_agent, BrowserFetcher, HttpClient, PolitenessGate};

/// How candidate pages are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Plain HTTP, structured data only.
    Http,
    /// Headless browser, structured data then DOM heuristics.
    Rendered,
}

impl ExtractionMode {
    fn profile(&self, settings: &Settings) -> ProfileSettings {
        match self {
            ExtractionMode::Http => settings.extraction.http,
            ExtractionMode::Rendered => settings.extraction.browser,
        }
    }

    fn default_policy(&self, settings: &Settings) -> DealPolicy {
        match self {
            ExtractionMode::Http => settings.extraction.http_policy,
            ExtractionMode::Rendered => settings.extraction.browser_policy,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ExtractionMode::Http => "http",
            ExtractionMode::Rendered => "browser",
        }
    }
}

/// Extract deals from discovered (or explicitly given) pages.
pub async fn cmd_extract(
    settings: &Settings,
    mode: ExtractionMode,
    args: ExtractArgs,
) -> anyhow::Result<()> {
    let scope = RunScope::parse(args.scope.as_deref());
    let profile = mode.profile(settings);
    let policy = args.policy.unwrap_or_else(|| mode.default_policy(settings));

    let candidates = if scope.reads_artifact() {
        let input = args
            .input
            .unwrap_or_else(|| settings.paths.discovery.clone());
        artifact::read_candidates(&input).with_context(|| {
            format!(
                "Failed to read discovery artifact {} (run `dealscout discover` first)",
                input.display()
            )
        })?
    } else {
        Vec::new()
    };

    let gate = PolitenessGate::new(profile.policy());
    let available = candidates.len();
    let urls = scope.select(candidates, &gate);
    println!(
        "{} {} candidate pages, processing {} ({}, {} mode, {} policy)",
        style("→").cyan(),
        available.max(urls.len()),
        urls.len(),
        scope,
        mode.label(),
        policy
    );

    let user_agent = settings.network.user_agent.as_deref();
    let pb = page_bar(urls.len());

    let mut run = match mode {
        ExtractionMode::Http => {
            let client = HttpClient::new(settings.network.timeout(), gate, user_agent)
                .context("Failed to build HTTP client")?;
            let extractor = StructuredDataExtractor::new(&settings.extraction.default_currency);
            run_http_extraction(&urls, &client, &extractor, &pb).await
        }
        ExtractionMode::Rendered => {
            let mut browser =
                BrowserFetcher::new(settings.browser.clone(), resolve_user_agent(user_agent));
            let extractor = RenderedPageExtractor::from_settings(&settings.extraction);
            run_rendered_extraction(&urls, &mut browser, &gate, &extractor, &pb).await
        }
    };
    pb.finish_and_clear();

    let deals = run.deals(policy);
    let out = args.out.unwrap_or_else(|| settings.paths.deals.clone());
    artifact::write_deals(&out, &deals)
        .with_context(|| format!("Failed to write deals artifact {}", out.display()))?;

    print_run_summary(&run);
    println!(
        "\n{} Saved {} deals to {}",
        style("✓").green(),
        deals.len(),
        out.display()
    );

    Ok(())
}

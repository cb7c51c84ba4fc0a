//! Shared helper functions for CLI commands.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::pipeline::ExtractionRun;

/// Bar for a loop over a known number of pages.
pub fn page_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb
}

/// Spinner for work of unknown length.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Truncate a string for progress messages.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}

/// Print the end-of-run summary for an extraction.
pub fn print_run_summary(run: &ExtractionRun) {
    println!("\n{}", style("Extraction Summary").bold());
    println!("{}", "-".repeat(40));
    println!("  Pages processed:   {}", run.pages_processed);
    if run.pages_failed > 0 {
        println!("  Pages failed:      {}", style(run.pages_failed).red());
    } else {
        println!("  Pages failed:      {}", run.pages_failed);
    }
    println!("  Pages without data: {}", run.pages_empty);
    println!("  Products extracted: {}", run.records_extracted());
    println!("  Deals kept:        {}", style(run.records_kept).green());
}

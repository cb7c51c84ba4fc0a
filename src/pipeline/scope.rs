//! How many candidates an extraction run processes.

use std::fmt;

use tracing::warn;

use crate::scrapers::PolitenessGate;

/// The single run-time scope input: nothing, a page cap, or one URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunScope {
    /// Process up to the profile's page cap.
    #[default]
    Default,
    /// Process up to `n` candidates, regardless of the profile cap.
    Cap(usize),
    /// Process exactly this URL, skipping the discovery artifact.
    SingleUrl(String),
}

impl RunScope {
    /// Interpret the positional argument (or `MAX_URLS`).
    ///
    /// A value starting with `http://` or `https://` selects a single URL, a
    /// positive integer sets the cap, and anything else falls back to the
    /// default cap.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return RunScope::Default;
        };

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return RunScope::SingleUrl(raw.to_string());
        }

        match raw.parse::<usize>() {
            Ok(n) if n > 0 => RunScope::Cap(n),
            _ => {
                warn!("Ignoring run scope {:?}; using the default cap", raw);
                RunScope::Default
            }
        }
    }

    /// Whether candidates come from the discovery artifact.
    pub fn reads_artifact(&self) -> bool {
        !matches!(self, RunScope::SingleUrl(_))
    }

    /// Number of pages to process out of `available` under `profile_cap`.
    pub fn effective_cap(&self, available: usize, profile_cap: usize) -> usize {
        match self {
            RunScope::Default => profile_cap.min(available),
            RunScope::Cap(n) => (*n).min(available),
            RunScope::SingleUrl(_) => 1,
        }
    }

    /// Apply the scope to the candidate list. The default cap is the page cap
    /// of the gate the run will wait on.
    pub fn select(&self, candidates: Vec<String>, gate: &PolitenessGate) -> Vec<String> {
        match self {
            RunScope::SingleUrl(url) => vec![url.clone()],
            _ => {
                let cap = self.effective_cap(candidates.len(), gate.max_pages());
                candidates.into_iter().take(cap).collect()
            }
        }
    }
}

impl fmt::Display for RunScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunScope::Default => write!(f, "default cap"),
            RunScope::Cap(n) => write!(f, "cap {}", n),
            RunScope::SingleUrl(url) => write!(f, "single URL {}", url),
        }
    }
}

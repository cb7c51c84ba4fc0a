//! JSON artifacts handed between stages.
//!
//! The discovery artifact is a JSON array of URL strings, the deals artifact
//! a JSON array of product records. Both are written pretty-printed and
//! replaced wholesale on every run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::ProductRecord;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ArtifactError + '_ {
    move |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn json_error(path: &Path) -> impl FnOnce(serde_json::Error) -> ArtifactError + '_ {
    move |source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    serde_json::from_str(&text).map_err(json_error(path))
}

/// Write `value` as pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(path))?;
    }
    let text = serde_json::to_string_pretty(value).map_err(json_error(path))?;
    fs::write(path, text).map_err(io_error(path))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

pub fn read_candidates(path: &Path) -> Result<Vec<String>, ArtifactError> {
    read_json(path)
}

pub fn write_candidates(path: &Path, candidates: &[String]) -> Result<(), ArtifactError> {
    write_json(path, candidates)
}

pub fn read_deals(path: &Path) -> Result<Vec<ProductRecord>, ArtifactError> {
    read_json(path)
}

pub fn write_deals(path: &Path, deals: &[ProductRecord]) -> Result<(), ArtifactError> {
    write_json(path, deals)
}

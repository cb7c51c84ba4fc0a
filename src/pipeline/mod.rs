//! Stage orchestration: run scope, drivers, deal filtering and artifacts.

pub mod artifact;
mod filter;
mod runner;
mod scope;

pub use artifact::ArtifactError;
pub use filter::DealPolicy;
pub use runner::{run_http_extraction, run_rendered_extraction, ExtractionRun};
pub use scope::RunScope;

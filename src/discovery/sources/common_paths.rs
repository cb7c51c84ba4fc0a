//! Conventional storefront sale paths, added without probing.

use async_trait::async_trait;

use crate::discovery::url_utils::origin_root;
use crate::discovery::{DiscoveryContext, DiscoveryError, DiscoverySource};

/// Discovery source that appends guessed sale paths under the target.
pub struct CommonPathsSource {
    paths: Vec<String>,
}

impl CommonPathsSource {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl DiscoverySource for CommonPathsSource {
    fn name(&self) -> &str {
        "common_paths"
    }

    async fn discover(&self, ctx: &DiscoveryContext<'_>) -> Result<Vec<String>, DiscoveryError> {
        let root = origin_root(&ctx.base);
        Ok(self
            .paths
            .iter()
            .filter_map(|p| root.join(p).ok())
            .map(|u| u.to_string())
            .collect())
    }
}

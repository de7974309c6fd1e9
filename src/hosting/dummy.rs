//! Dummy image host implementation
//!
//! Derives the public URL by joining the display name onto a configured base URL
//! without any network call. Useful for development and tests.

use std::path::Path;

use async_trait::async_trait;
use url::Url;

use crate::config::DummyConfig;
use crate::hosting::{HostError, ImageHost, Result};

pub struct DummyHost {
    base_url: Url,
}

impl From<DummyConfig> for DummyHost {
    fn from(config: DummyConfig) -> Self {
        Self {
            base_url: config.base_url,
        }
    }
}

#[async_trait]
impl ImageHost for DummyHost {
    async fn publish(&self, path: &Path, name: &str) -> Result<Url> {
        // Keep the read-back contract of real hosts so callers see the same errors
        tokio::fs::metadata(path).await.map_err(|source| HostError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let url = self
            .base_url
            .join(name)
            .map_err(|e| HostError::InvalidResponse(format!("derived URL is invalid: {e}")))?;

        tracing::info!(%url, "Dummy host published (no network call)");
        Ok(url)
    }
}

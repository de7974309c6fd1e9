//! Image host abstraction layer
//!
//! This module defines the `ImageHost` trait which abstracts publishing an uploaded
//! image to an external hosting service (Cloudinary, etc.).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use crate::config::HostingConfig;

pub mod cloudinary;
pub mod dummy;

/// Create an image host from configuration
///
/// This is the single point where we convert config into host instances.
/// Adding a new host requires adding a match arm here.
pub fn create_host(config: &HostingConfig) -> Box<dyn ImageHost> {
    match config {
        HostingConfig::Cloudinary(cloudinary_config) => Box::new(cloudinary::CloudinaryHost::from(cloudinary_config.clone())),
        HostingConfig::Dummy(dummy_config) => Box::new(dummy::DummyHost::from(dummy_config.clone())),
    }
}

/// Result type for image host operations
pub type Result<T> = std::result::Result<T, HostError>;

/// Errors that can occur while publishing an image
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The scratch file disappeared or became unreadable between write and publish
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote call failed (auth, quota, network); never retried
    #[error("Image host API error: {0}")]
    Api(String),

    /// The remote call succeeded but the response could not be interpreted
    #[error("Unexpected image host response: {0}")]
    InvalidResponse(String),
}

/// Abstract image host interface
///
/// Implementors publish a locally stored file under a caller-supplied display name and
/// return the publicly reachable URL for the asset. No implementation deletes or
/// modifies the local file; cleanup belongs to the caller.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Publish the file at `path` under `name` and return its public URL.
    ///
    /// The display name is used verbatim as the remote asset identifier, so publishing
    /// the same name twice overwrites the remote asset.
    async fn publish(&self, path: &Path, name: &str) -> Result<Url>;
}

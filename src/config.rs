//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `PICDROP_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `PICDROP_` override YAML values
//! 3. **Compatibility variables** - `PORT`, `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY` and
//!    `CLOUDINARY_API_SECRET`, matching the names most Cloudinary tooling expects
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `PICDROP_HOSTING__PROVIDER=dummy` sets the `hosting.provider` field.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! PORT=8080
//!
//! # Hosting credentials (preferred method)
//! CLOUDINARY_CLOUD_NAME=demo
//! CLOUDINARY_API_KEY=123456789
//! CLOUDINARY_API_SECRET=abcdef
//!
//! # Override nested values
//! PICDROP_OPEN_BROWSER=false
//! PICDROP_SCRATCH_DIR=/tmp/picdrop
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PICDROP_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment variables.
/// All fields have sensible defaults defined in the `Default` implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Directory for per-request scratch files (created on demand)
    pub scratch_dir: PathBuf,
    /// Maximum accepted upload body size in bytes
    pub max_upload_bytes: usize,
    /// Open the published URL in the local default browser after each upload
    pub open_browser: bool,
    /// Image hosting provider configuration (Cloudinary, dummy, etc.)
    pub hosting: HostingConfig,
    /// Compatibility: `CLOUDINARY_CLOUD_NAME` environment variable override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloudinary_cloud_name: Option<String>,
    /// Compatibility: `CLOUDINARY_API_KEY` environment variable override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloudinary_api_key: Option<String>,
    /// Compatibility: `CLOUDINARY_API_SECRET` environment variable override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloudinary_api_secret: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            scratch_dir: PathBuf::from("scratch"),
            max_upload_bytes: 25 * 1024 * 1024,
            open_browser: true,
            hosting: HostingConfig::Cloudinary(CloudinaryConfig::default()),
            cloudinary_cloud_name: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
        }
    }
}

/// Image hosting provider configuration.
///
/// Tagged by `provider` so new hosts can be added without touching existing config files.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum HostingConfig {
    /// Cloudinary image hosting (the default)
    Cloudinary(CloudinaryConfig),
    /// No-op host for development: derives URLs without any network call
    Dummy(DummyConfig),
}

/// Cloudinary account and endpoint configuration.
///
/// Credentials default to empty strings; publishing will fail at the remote call until
/// they are supplied via config file or the `CLOUDINARY_*` environment variables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CloudinaryConfig {
    /// Cloudinary cloud (account) name
    pub cloud_name: String,
    /// API key for the account
    pub api_key: String,
    /// API secret used to sign upload requests
    pub api_secret: String,
    /// Upload API base URL (overridable for tests)
    pub api_base: Url,
    /// Delivery base URL used when the upload response carries no URL
    pub delivery_base: Url,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            api_base: Url::parse("https://api.cloudinary.com").expect("static URL"),
            delivery_base: Url::parse("https://res.cloudinary.com").expect("static URL"),
        }
    }
}

/// Dummy host configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DummyConfig {
    /// Base URL the display name is joined onto
    pub base_url: Url,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // Apply the CLOUDINARY_* compatibility variables onto the hosting section.
        // They only make sense for the Cloudinary provider and are ignored otherwise.
        let cloud_name = config.cloudinary_cloud_name.take();
        let api_key = config.cloudinary_api_key.take();
        let api_secret = config.cloudinary_api_secret.take();
        if let HostingConfig::Cloudinary(cloudinary) = &mut config.hosting {
            if let Some(cloud_name) = cloud_name {
                cloudinary.cloud_name = cloud_name;
            }
            if let Some(api_key) = api_key {
                cloudinary.api_key = api_key;
            }
            if let Some(api_secret) = api_secret {
                cloudinary.api_secret = api_secret;
            }
        }

        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values.
            // PICDROP_CONFIG belongs to the CLI layer, not the config structure.
            .merge(Env::prefixed("PICDROP_").split("__").ignore(&["config"]))
            // Common PORT and CLOUDINARY_* patterns the original tooling expects
            .merge(Env::raw().only(&[
                "PORT",
                "CLOUDINARY_CLOUD_NAME",
                "CLOUDINARY_API_KEY",
                "CLOUDINARY_API_SECRET",
            ]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

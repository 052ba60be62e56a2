//! `load_config` module: loads and adapts a static YAML config into the
//! internal [`PublishConfig`].
//!
//! This module is the only place where untrusted YAML is parsed and mapped
//! to the strongly-typed core structs.
//!
//! # Responsibilities
//! - Parse user-supplied YAML configuration files into type-safe Rust structs
//! - Apply defaults for the storage host, listing endpoint and poll bounds
//! - Ensure robust error messages for CLI and tests: any failure in loading
//!   must result in clear diagnostics.
//! - Acts as the adapter layer decoupling the input schema from the domain core
//!
//! Secrets (the deploy token, an optional storage token) never live in the
//! YAML; the transport clients read them from the environment at
//! construction time.
//!
//! # Errors
//! All errors in this module use `anyhow::Error` for context-rich
//! diagnostics, and are surfaced at the CLI boundary.
//!
//! For the accepted YAML schema, see the README.

use anyhow::Result;
use pkg_index_core::config::{PollConfig, PublishConfig, SiteConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

fn default_storage_host() -> String {
    "storage.googleapis.com".to_string()
}

fn default_storage_api_base() -> String {
    "https://storage.googleapis.com/storage/v1".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub storage: StorageSection,
    pub deploy: DeploySection,
    #[serde(default)]
    pub poll: PollSection,
}

#[derive(Debug, Deserialize)]
pub struct StorageSection {
    /// Name of the bucket whose objects make up the index.
    pub bucket: String,
    /// Host used in public object URLs.
    #[serde(default = "default_storage_host")]
    pub host: String,
    /// Base URL of the object-listing API.
    #[serde(default = "default_storage_api_base")]
    pub api_base: String,
}

#[derive(Debug, Deserialize)]
pub struct DeploySection {
    /// Site identifier at the deploy service.
    pub site_id: String,
    /// Base URL of the deploy API.
    pub api_base: String,
}

/// Poll bounds in YAML-friendly units; defaults match [`PollConfig`].
#[derive(Debug, Deserialize)]
pub struct PollSection {
    #[serde(default = "PollSection::default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "PollSection::default_initial_interval_secs")]
    pub initial_interval_secs: u64,
    #[serde(default = "PollSection::default_max_interval_secs")]
    pub max_interval_secs: u64,
}

impl PollSection {
    fn default_max_attempts() -> u32 {
        PollConfig::default().max_attempts
    }

    fn default_initial_interval_secs() -> u64 {
        PollConfig::default().initial_interval.as_secs()
    }

    fn default_max_interval_secs() -> u64 {
        PollConfig::default().max_interval.as_secs()
    }
}

impl Default for PollSection {
    fn default() -> Self {
        PollSection {
            max_attempts: Self::default_max_attempts(),
            initial_interval_secs: Self::default_initial_interval_secs(),
            max_interval_secs: Self::default_max_interval_secs(),
        }
    }
}

impl CliConfig {
    /// Map the YAML-side sections onto the core pipeline config.
    pub fn to_publish_config(&self) -> PublishConfig {
        PublishConfig {
            site: SiteConfig {
                bucket: self.storage.bucket.clone(),
                storage_host: self.storage.host.clone(),
            },
            poll: PollConfig {
                max_attempts: self.poll.max_attempts,
                initial_interval: Duration::from_secs(self.poll.initial_interval_secs),
                max_interval: Duration::from_secs(self.poll.max_interval_secs),
            },
        }
    }
}

/// Loads a static YAML config file (no secrets).
/// Returns a processable CLI config for use by the CLI.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    Ok(config)
}

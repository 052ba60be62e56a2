//! # pkg-index CLI Interface (Module)
//!
//! This module implements the full CLI interface for pkg-index—handling
//! command parsing, argument validation, and the main entrypoint.
//!
//! All core business logic (index building, rendering, the publish
//! pipeline) lives in the [`pkg-index-core`] crate. This module is strictly
//! for CLI glue, ergonomic argument exposure, and orchestration: it loads
//! the YAML config, constructs the concrete storage and deploy clients from
//! config plus environment secrets, and hands everything to the pipeline.
//!
//! ## How To Use
//! - For command-line users: use the installed `pkg-index` binary with `--help`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! [`pkg-index-core`]: ../../pkg-index-core/
//! [`Cli`]: struct.Cli.html
//! [`run`]: fn.run.html

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pkg_index_core::publish::publish;

use crate::deploy::HttpDeployApi;
use crate::load_config::load_config;
use crate::storage::GcsLister;

/// CLI for pkg-index: publish a bucket-backed static package index.
#[derive(Parser)]
#[clap(
    name = "pkg-index",
    version,
    about = "Render the package index of an object-storage bucket and deploy it as a static site"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the index for the configured bucket and deploy it
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish { config } => {
            let config = load_config(config)?;
            tracing::info!(command = "publish", "Starting publish process");

            let lister = GcsLister::new_from_env(&config.storage)
                .map_err(|e| anyhow::anyhow!("Failed to construct bucket lister: {e}"))?;
            let deployer = HttpDeployApi::new_from_env(&config.deploy)
                .map_err(|e| anyhow::anyhow!("Failed to construct deploy client: {e}"))?;

            let publish_config = config.to_publish_config();
            publish_config.trace_loaded();

            match publish(&publish_config, &lister, &deployer).await {
                Ok(report) => {
                    tracing::info!(command = "publish", ?report, "Publish complete");
                    match serde_json::to_string_pretty(&report) {
                        Ok(json) => {
                            tracing::debug!(json = %json, "Publish report as JSON")
                        }
                        Err(e) => {
                            tracing::error!(error = ?e, "Failed to serialize publish report as JSON")
                        }
                    }
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "publish", error = %e, "Publish failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}

//! High-level pipeline: orchestrates list → index → render → archive → deploy.
//!
//! This module provides the top-level orchestration logic for publishing the
//! package index of a bucket as a static site. It implements a coordinated
//! pipeline that:
//!   - Lists every object key in the bucket via [`contract::BucketLister`]
//!   - Groups the keys into a [`PackageIndex`] and renders the HTML routes
//!   - Writes and zips the site inside a unique per-run build directory
//!   - Uploads the archive via [`contract::DeployApi`] and polls the
//!     deployment until it is ready, with bounded backoff
//!   - Removes the build directory once the deploy cycle succeeded.
//!
//! # Responsibilities
//! - Fail-fast orchestration: the first failed step aborts the run
//! - Invokes logging throughout for traceability (see tracing events)
//! - Holds no ambient state: config and clients are explicit parameters
//!
//! # Error Handling
//! Each failure maps to a distinct [`PublishError`] variant, including the
//! two terminal polling outcomes: a deployment that reports a remote error
//! state and one that exhausts the attempt budget. Polling never blocks
//! unboundedly.
//!
//! # Navigation
//! - Main entrypoint: [`publish`]
//! - Poll loop: [`await_ready`]
//!
//! [`contract::BucketLister`]: crate::contract::BucketLister
//! [`contract::DeployApi`]: crate::contract::DeployApi
//! [`PackageIndex`]: crate::index::PackageIndex

use std::fmt;
use std::io;

use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::archive::archive_site;
use crate::config::{PollConfig, PublishConfig};
use crate::contract::{BucketLister, DeployApi, DeployState, ServiceError};
use crate::index::build_index;
use crate::render::{render, write_site};

/// Summary of a completed publish run.
#[derive(Debug, serde::Serialize)]
pub struct PublishReport {
    pub packages: usize,
    pub files: usize,
    pub deploy_id: String,
    pub poll_attempts: u32,
}

/// Failure kinds of the publish pipeline.
#[derive(Debug)]
pub enum PublishError {
    /// Bucket listing failed.
    List(ServiceError),
    /// Rendering or other filesystem work failed.
    Io(io::Error),
    /// Writing the site archive failed.
    Archive(io::Error),
    /// The deploy creation request failed or its response was malformed.
    Deploy(ServiceError),
    /// A status poll failed at the transport level.
    Status(ServiceError),
    /// The remote deployment reported a terminal error state.
    DeployFailed { deploy_id: String },
    /// The deployment did not become ready within the attempt budget.
    DeployTimedOut { deploy_id: String, attempts: u32 },
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::List(e) => write!(f, "bucket listing failed: {e}"),
            PublishError::Io(e) => write!(f, "filesystem error: {e}"),
            PublishError::Archive(e) => write!(f, "writing site archive failed: {e}"),
            PublishError::Deploy(e) => write!(f, "deploy creation failed: {e}"),
            PublishError::Status(e) => write!(f, "deploy status request failed: {e}"),
            PublishError::DeployFailed { deploy_id } => {
                write!(f, "deployment {deploy_id} reported a terminal error state")
            }
            PublishError::DeployTimedOut {
                deploy_id,
                attempts,
            } => write!(
                f,
                "deployment {deploy_id} was not ready after {attempts} status requests"
            ),
        }
    }
}

impl std::error::Error for PublishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PublishError::List(e) | PublishError::Deploy(e) | PublishError::Status(e) => {
                Some(e.as_ref())
            }
            PublishError::Io(e) | PublishError::Archive(e) => Some(e),
            PublishError::DeployFailed { .. } | PublishError::DeployTimedOut { .. } => None,
        }
    }
}

impl From<io::Error> for PublishError {
    fn from(e: io::Error) -> Self {
        PublishError::Io(e)
    }
}

/// Entrypoint: publish the bucket's package index according to config.
pub async fn publish<L, D>(
    config: &PublishConfig,
    lister: &L,
    deployer: &D,
) -> Result<PublishReport, PublishError>
where
    L: BucketLister,
    D: DeployApi,
{
    info!("[PUBLISH] Starting publish pipeline");

    // --- Step 1: List ---
    let keys = lister.list_objects().await.map_err(|e| {
        error!(error = ?e, "[PUBLISH][ERROR] Bucket listing failed");
        PublishError::List(e)
    })?;
    info!(objects = keys.len(), "[PUBLISH] Listed bucket objects");

    // --- Step 2: Index ---
    let index = build_index(&keys);
    let files: usize = index.values().map(Vec::len).sum();
    info!(
        packages = index.len(),
        files, "[PUBLISH] Built package index"
    );

    // --- Step 3: Render into a unique per-run build directory ---
    let routes = render(&index, &config.site);
    let build_dir = tempfile::Builder::new().prefix("pkg-index-").tempdir()?;
    let site_dir = build_dir.path().join("site");
    write_site(&routes, &site_dir)?;
    info!(
        routes = routes.len(),
        dir = %site_dir.display(),
        "[PUBLISH] Rendered static site"
    );

    // --- Step 4: Archive ---
    let archive_path = build_dir.path().join("site.zip");
    archive_site(&site_dir, &archive_path).map_err(PublishError::Archive)?;
    let archive = std::fs::read(&archive_path)?;

    // --- Step 5: Deploy ---
    info!(bytes = archive.len(), "[PUBLISH] Uploading site archive");
    let deployment = deployer.create_deploy(archive).await.map_err(|e| {
        error!(error = ?e, "[PUBLISH][ERROR] Deploy creation failed");
        PublishError::Deploy(e)
    })?;
    info!(
        deploy_id = %deployment.id,
        state = ?deployment.state,
        "[PUBLISH] Created deployment"
    );

    // --- Step 6: Poll ---
    let poll_attempts = await_ready(deployer, &deployment.id, &config.poll).await?;

    // --- Step 7: Cleanup ---
    // The build directory is only removed once the full deploy cycle
    // succeeded; on the error paths above it is dropped and removed with
    // the TempDir guard.
    build_dir.close()?;

    let report = PublishReport {
        packages: index.len(),
        files,
        deploy_id: deployment.id,
        poll_attempts,
    };
    match serde_json::to_string(&report) {
        Ok(json) => debug!(%json, "[PUBLISH] Report"),
        Err(e) => error!(error = ?e, "[PUBLISH] Failed to serialize report as JSON"),
    }
    info!(deploy_id = %report.deploy_id, "[PUBLISH] Deployment is ready");
    Ok(report)
}

/// Poll the deploy API until `deploy_id` reports ready.
///
/// Bounded: at most `poll.max_attempts` status requests, sleeping with a
/// doubling backoff (capped at `poll.max_interval`) between attempts.
/// Returns the number of requests issued. A remote `error` state and an
/// exhausted attempt budget are distinct terminal failures.
pub async fn await_ready<D>(
    deployer: &D,
    deploy_id: &str,
    poll: &PollConfig,
) -> Result<u32, PublishError>
where
    D: DeployApi,
{
    let mut interval = poll.initial_interval;
    for attempt in 1..=poll.max_attempts {
        let deployment = deployer.get_deploy(deploy_id).await.map_err(|e| {
            error!(
                error = ?e,
                deploy_id, attempt,
                "[PUBLISH][ERROR] Deploy status request failed"
            );
            PublishError::Status(e)
        })?;
        match deployment.state {
            DeployState::Ready => {
                info!(deploy_id, attempt, "[PUBLISH] Deployment reported ready");
                return Ok(attempt);
            }
            DeployState::Error => {
                error!(
                    deploy_id,
                    attempt, "[PUBLISH][ERROR] Deployment reported a terminal error state"
                );
                return Err(PublishError::DeployFailed {
                    deploy_id: deploy_id.to_string(),
                });
            }
            state => {
                debug!(
                    deploy_id,
                    attempt,
                    ?state,
                    interval_ms = interval.as_millis() as u64,
                    "[PUBLISH] Deployment not ready yet"
                );
                if attempt < poll.max_attempts {
                    sleep(interval).await;
                    interval = (interval * 2).min(poll.max_interval);
                }
            }
        }
    }
    Err(PublishError::DeployTimedOut {
        deploy_id: deploy_id.to_string(),
        attempts: poll.max_attempts,
    })
}

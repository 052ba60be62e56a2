//! # contract: service interfaces for listing and deploying
//!
//! This module defines the two traits the publish pipeline depends on:
//! [`BucketLister`] for enumerating object keys in the source bucket and
//! [`DeployApi`] for uploading the site archive and polling deployment
//! state. Concrete transport clients implement them in the CLI crate.
//!
//! ## Interface & Extensibility
//! - All methods are async, returning results with boxed error types.
//! - Error handling is uniform: all transport/caller errors return boxed
//!   trait objects ([`ServiceError`]).
//! - Meant for both production code and robust mocking in tests.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall` so consumers can generate
//!   deterministic mocks for unit/integration tests (exported behind the
//!   default `test-export-mocks` feature).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Boxed error type shared by all service contracts.
pub type ServiceError = Box<dyn std::error::Error + Send + Sync>;

/// Remote state of a deployment, as reported by the deploy API.
///
/// `Ready` is the terminal success state. `Error` (alias `failed`) is a
/// terminal failure; anything else the provider reports (`uploading`,
/// `processing`, ...) deserialises to `Unknown` and is treated as still in
/// flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployState {
    Pending,
    Ready,
    #[serde(alias = "failed")]
    Error,
    #[serde(other)]
    Unknown,
}

impl Default for DeployState {
    fn default() -> Self {
        DeployState::Pending
    }
}

/// A deployment as returned by the deploy API.
///
/// `id` is required: a creation response without one is malformed and must
/// fail before any polling starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,
    #[serde(default)]
    pub state: DeployState,
}

/// Trait for enumerating every object key in the source bucket.
/// The implementor is responsible for connecting to the storage API and for
/// exhausting any pagination it imposes.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait BucketLister: Send + Sync {
    /// List all object keys (`<package>/<file>`) in the bucket.
    ///
    /// Transport or auth failures propagate immediately; there is no retry.
    async fn list_objects(&self) -> Result<Vec<String>, ServiceError>;
}

/// Trait for creating a deployment from an archive and polling its state.
/// Implemented by the real HTTP client and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DeployApi: Send + Sync {
    /// Upload the site archive, returning the created deployment.
    async fn create_deploy(&self, archive: Vec<u8>) -> Result<Deployment, ServiceError>;

    /// Fetch the current state of a deployment by id.
    async fn get_deploy<'a>(&self, deploy_id: &'a str) -> Result<Deployment, ServiceError>;
}

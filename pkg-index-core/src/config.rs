use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Identity of the published bucket: used for building public object URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub bucket: String,
    /// Host serving the bucket's objects publicly, e.g. `storage.googleapis.com`.
    pub storage_host: String,
}

impl SiteConfig {
    /// Public download URL for one object: `https://<host>/<bucket>/<package>/<file>`.
    pub fn object_url(&self, package: &str, file: &str) -> String {
        format!(
            "https://{}/{}/{}/{}",
            self.storage_host, self.bucket, package, file
        )
    }
}

/// Bounds for the deploy status poll loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Maximum number of status requests before giving up.
    pub max_attempts: u32,
    /// Sleep before the second attempt; doubles per attempt.
    pub initial_interval: Duration,
    /// Upper bound on the backoff interval.
    pub max_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            max_attempts: 60,
            initial_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(30),
        }
    }
}

/// Everything the publish pipeline needs besides the service clients.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub site: SiteConfig,
    pub poll: PollConfig,
}

impl PublishConfig {
    pub fn trace_loaded(&self) {
        info!(
            bucket = %self.site.bucket,
            storage_host = %self.site.storage_host,
            poll_max_attempts = self.poll.max_attempts,
            "Loaded PublishConfig"
        );
        debug!(?self, "PublishConfig loaded (full debug)");
    }
}

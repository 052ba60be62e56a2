//! Deploy API client: archive upload and status polling endpoints.
//!
//! Bridges the [`DeployApi`] contract to the real HTTP service:
//! `POST /sites/<site_id>/deploys` with the zip as the request body, and
//! `GET /deploys/<id>` for status. Both carry bearer-token authorization;
//! the token comes from the `DEPLOY_TOKEN` environment variable.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::env;

use pkg_index_core::contract::{DeployApi, DeployState, Deployment, ServiceError};

use crate::load_config::DeploySection;

pub struct HttpDeployApi {
    client: reqwest::Client,
    api_base: String,
    site_id: String,
    token: String,
}

/// Status responses only guarantee a `state` field.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    state: DeployState,
}

impl HttpDeployApi {
    pub fn new_from_env(config: &DeploySection) -> Result<Self, ServiceError> {
        dotenvy::dotenv().ok(); // loads environment variables from .env if present
        match env::var("DEPLOY_TOKEN") {
            Ok(token) => {
                tracing::info!(
                    site_id = %config.site_id,
                    api_base = %config.api_base,
                    token_set = !token.is_empty(),
                    "Initialized deploy client from environment"
                );
                Ok(HttpDeployApi {
                    client: reqwest::Client::new(),
                    api_base: config.api_base.trim_end_matches('/').to_string(),
                    site_id: config.site_id.clone(),
                    token,
                })
            }
            Err(e) => {
                tracing::error!(error = ?e, "DEPLOY_TOKEN missing in environment");
                Err(Box::new(e))
            }
        }
    }
}

#[async_trait]
impl DeployApi for HttpDeployApi {
    async fn create_deploy(&self, archive: Vec<u8>) -> Result<Deployment, ServiceError> {
        // Compute a SHA256 digest of the archive for the trace stream
        let digest = {
            let mut hasher = Sha256::new();
            hasher.update(&archive);
            format!("{:x}", hasher.finalize())
        };

        let url = format!("{}/sites/{}/deploys", self.api_base, self.site_id);
        tracing::info!(
            url = %url,
            bytes = archive.len(),
            sha256 = %digest,
            "Uploading site archive"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/zip")
            .body(archive)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            tracing::error!(
                %status,
                url = %url,
                "Deploy creation returned error. Response body: {body}"
            );
            return Err(format!("deploy creation failed with status {status}: {body}").into());
        }

        // `Deployment` requires an `id`; a response without one fails here,
        // before any polling is issued.
        let deployment: Deployment = response.json().await.map_err(|e| {
            tracing::error!(error = ?e, "Malformed deploy creation response");
            e
        })?;
        tracing::info!(
            deploy_id = %deployment.id,
            state = ?deployment.state,
            "Successfully created deployment"
        );
        Ok(deployment)
    }

    async fn get_deploy<'a>(&self, deploy_id: &'a str) -> Result<Deployment, ServiceError> {
        let url = format!("{}/deploys/{}", self.api_base, deploy_id);
        tracing::debug!(url = %url, "Requesting deployment status");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            tracing::error!(
                %status,
                url = %url,
                deploy_id,
                "Deploy status returned error. Response body: {body}"
            );
            return Err(format!("deploy status failed with status {status}: {body}").into());
        }

        let parsed: StatusResponse = response.json().await?;
        tracing::debug!(deploy_id, state = ?parsed.state, "Fetched deployment status");
        Ok(Deployment {
            id: deploy_id.to_string(),
            state: parsed.state,
        })
    }
}

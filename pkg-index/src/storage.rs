//! Bucket listing over the storage provider's JSON object-listing API.
//!
//! This is the concrete [`BucketLister`] used by the CLI. It pages through
//! `GET <api_base>/b/<bucket>/o` following `nextPageToken` until the
//! listing is exhaustive, and returns the raw object keys untouched;
//! grouping and filtering happen in the core index builder.

use async_trait::async_trait;
use serde::Deserialize;
use std::env;

use pkg_index_core::contract::{BucketLister, ServiceError};

use crate::load_config::StorageSection;

/// Lists bucket objects via the JSON object-listing endpoint.
///
/// Public buckets need no credentials; a bearer token is picked up from
/// `STORAGE_TOKEN` when the bucket requires one.
pub struct GcsLister {
    client: reqwest::Client,
    api_base: String,
    bucket: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<ObjectEntry>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectEntry {
    name: String,
}

impl GcsLister {
    pub fn new_from_env(config: &StorageSection) -> Result<Self, ServiceError> {
        dotenvy::dotenv().ok(); // loads environment variables from .env if present
        let token = env::var("STORAGE_TOKEN").ok();
        tracing::info!(
            bucket = %config.bucket,
            api_base = %config.api_base,
            token_set = token.is_some(),
            "Initialized bucket lister"
        );
        Ok(GcsLister {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            token,
        })
    }
}

#[async_trait]
impl BucketLister for GcsLister {
    async fn list_objects(&self) -> Result<Vec<String>, ServiceError> {
        let url = format!("{}/b/{}/o", self.api_base, self.bucket);
        let mut keys: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .query(&[("fields", "items(name),nextPageToken")]);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            tracing::info!(url = %url, continued = page_token.is_some(), "Requesting bucket object page");
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
                tracing::error!(
                    %status,
                    url = %url,
                    "Object listing returned error. Response body: {body}"
                );
                return Err(format!("object listing failed with status {status}: {body}").into());
            }

            let page: ListResponse = response.json().await?;
            keys.extend(page.items.into_iter().map(|object| object.name));

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::info!(count = keys.len(), bucket = %self.bucket, "Listed bucket objects");
        Ok(keys)
    }
}

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::entities::{Bodyguard, CctvCamera, GuardDog, SecurityEvent};
use crate::store::{EntityStore, StoreError};

/// HTTP client against the external document store.
///
/// Collections are exposed as `GET {base}/collections/{name}/documents`
/// returning a JSON array of records.
pub struct DocumentStoreClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl DocumentStoreClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client for entity store");

        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_collection<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, StoreError> {
        let url = format!("{}/collections/{}/documents", self.base_url, collection);
        debug!(url = %url, collection = %collection, "Fetching entity collection");

        let response = self.http_client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                collection: collection.to_string(),
                status,
                body,
            });
        }

        let records: Vec<T> =
            response
                .json()
                .await
                .map_err(|e| StoreError::Payload {
                    collection: collection.to_string(),
                    reason: e.to_string(),
                })?;

        Ok(records)
    }
}

#[async_trait]
impl EntityStore for DocumentStoreClient {
    async fn list_dogs(&self) -> Result<Vec<GuardDog>, StoreError> {
        self.fetch_collection("guard_dogs").await
    }

    async fn list_guards(&self) -> Result<Vec<Bodyguard>, StoreError> {
        self.fetch_collection("bodyguards").await
    }

    async fn list_cameras(&self) -> Result<Vec<CctvCamera>, StoreError> {
        self.fetch_collection("cctv_cameras").await
    }

    async fn list_events(&self) -> Result<Vec<SecurityEvent>, StoreError> {
        self.fetch_collection("security_events").await
    }
}

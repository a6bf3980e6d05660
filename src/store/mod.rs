//! Read-only access to the externally-owned security entity collections.
//!
//! The document store is an external collaborator: this backend never writes
//! dogs, guards, cameras or events. The trait exists so the query pipeline
//! can run against either the live document store or an in-memory snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entities::{Bodyguard, CctvCamera, GuardDog, SecurityEvent};

pub mod http;
pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("entity store returned status {status} for {collection}: {body}")]
    Status {
        collection: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected payload from entity store for {collection}: {reason}")]
    Payload { collection: String, reason: String },
}

/// Snapshot reads against the entity collections. Each call is an
/// independent read; two calls in the same query are allowed to observe
/// different store states.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn list_dogs(&self) -> Result<Vec<GuardDog>, StoreError>;

    async fn list_guards(&self) -> Result<Vec<Bodyguard>, StoreError>;

    async fn list_cameras(&self) -> Result<Vec<CctvCamera>, StoreError>;

    async fn list_events(&self) -> Result<Vec<SecurityEvent>, StoreError>;

    /// Events created at or after `cutoff`, most recent first.
    async fn list_events_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<SecurityEvent>, StoreError> {
        let mut events: Vec<SecurityEvent> = self
            .list_events()
            .await?
            .into_iter()
            .filter(|e| e.created_at >= cutoff)
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }
}

// ABOUTME: Delivery client posting health snapshots to the ingestion endpoint
// ABOUTME: Classifies each attempt as delivered, rejected, or transport failure
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Snapshot Delivery
//!
//! One POST per snapshot, no retry and no queue. A lost delivery is covered by
//! the next cycle, whose window still starts at the same anchor.

/// Shared HTTP client with configured timeouts
pub mod http_client;

pub use http_client::{initialize_shared_client, shared_client};

use health_sync_core::constants::wire::{CONTENT_TYPE_JSON, HEALTH_DATA_KEY};
use health_sync_core::errors::{SyncError, SyncResult};
use health_sync_core::models::HealthSnapshot;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Successful delivery receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivered {
    /// 2xx status the sink answered with
    pub status: u16,
}

/// Posts snapshots to the remote ingestion endpoint
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: Client,
    endpoint: String,
}

impl DeliveryClient {
    /// Client posting to `endpoint` through the shared HTTP client
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(shared_client().clone(), endpoint)
    }

    /// Client posting to `endpoint` through a caller-supplied HTTP client
    #[must_use]
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint snapshots are posted to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request body: the snapshot wrapped under `healthData`
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the snapshot cannot be encoded
    pub fn body_for(snapshot: &HealthSnapshot) -> SyncResult<Value> {
        let encoded = serde_json::to_value(snapshot).map_err(|e| SyncError::Serialization {
            reason: e.to_string(),
        })?;
        let mut body = Map::with_capacity(1);
        body.insert(HEALTH_DATA_KEY.to_owned(), encoded);
        Ok(Value::Object(body))
    }

    /// POST the snapshot once and classify the response
    ///
    /// # Errors
    ///
    /// - `Rejected` when the sink answers outside 2xx (body is not read)
    /// - `TransportFailure` when the request could not complete
    /// - `Serialization` when the snapshot cannot be encoded
    pub async fn deliver(&self, snapshot: &HealthSnapshot) -> SyncResult<Delivered> {
        let body = serde_json::to_vec(&Self::body_for(snapshot)?).map_err(|e| {
            SyncError::Serialization {
                reason: e.to_string(),
            }
        })?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "Health data delivery failed");
                SyncError::transport(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            info!(
                endpoint = %self.endpoint,
                http.status = status.as_u16(),
                records = snapshot.total_records(),
                "Health data delivered"
            );
            return Ok(Delivered {
                status: status.as_u16(),
            });
        }

        let status_text = status.canonical_reason().unwrap_or_default().to_owned();
        warn!(
            endpoint = %self.endpoint,
            http.status = status.as_u16(),
            http.status_text = %status_text,
            "Health data delivery rejected"
        );
        Err(SyncError::Rejected {
            status: status.as_u16(),
            status_text,
        })
    }
}

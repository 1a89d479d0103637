//! HTTP client for a remote graph service
//!
//! Expects `GET {base_url}/claims/{claim_id}/subgraph` to answer with a
//! JSON [`SubgraphPayload`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{GraphStore, GraphStoreError};
use crate::model::SubgraphPayload;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Graph store backed by a remote graph service
pub struct HttpGraphStore {
    client: Client,
    base_url: Url,
}

impl HttpGraphStore {
    /// Create a client with the default request timeout
    pub fn new(base_url: Url) -> Result<Self, GraphStoreError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, GraphStoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn subgraph_url(&self, claim_id: &str) -> Result<Url, GraphStoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GraphStoreError::ParseError(format!(
                    "Base URL cannot hold a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["claims", claim_id, "subgraph"]);
        Ok(url)
    }
}

#[async_trait]
impl GraphStore for HttpGraphStore {
    async fn fetch_subgraph(&self, claim_id: &str) -> Result<SubgraphPayload, GraphStoreError> {
        let url = self.subgraph_url(claim_id)?;

        tracing::debug!(claim_id = %claim_id, url = %url, "Fetching subgraph from graph service");

        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GraphStoreError::NotFound(claim_id.to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GraphStoreError::Unreachable(format!(
                "Unexpected status {}: {}",
                status, body
            )));
        }

        let subgraph: SubgraphPayload = response.json().await.map_err(|e| {
            GraphStoreError::ParseError(format!("Failed to deserialize subgraph: {}", e))
        })?;

        tracing::debug!(
            claim_id = %claim_id,
            nodes = subgraph.nodes.len(),
            edges = subgraph.edges.len(),
            "Successfully fetched subgraph"
        );

        Ok(subgraph)
    }
}

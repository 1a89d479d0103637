//! Graph store collaborators that hand out pre-materialized claim subgraphs

mod cache;
mod http;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::SubgraphPayload;

pub use cache::{CacheError, CachingGraphStore, SubgraphCache};
pub use http::HttpGraphStore;
pub use memory::InMemoryGraphStore;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GraphStoreError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Graph store unreachable: {0}")]
    Unreachable(String),

    #[error("No subgraph for claim: {0}")]
    NotFound(String),

    #[error("Failed to parse subgraph: {0}")]
    ParseError(String),
}

/// Read-only access to the entity-relationship graph around a claim
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Fetch the materialized subgraph around `claim_id`
    async fn fetch_subgraph(&self, claim_id: &str) -> Result<SubgraphPayload, GraphStoreError>;
}

#[async_trait]
impl<T: GraphStore + ?Sized> GraphStore for Arc<T> {
    async fn fetch_subgraph(&self, claim_id: &str) -> Result<SubgraphPayload, GraphStoreError> {
        (**self).fetch_subgraph(claim_id).await
    }
}

//! Fixture-backed graph store

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;

use super::{GraphStore, GraphStoreError};
use crate::model::SubgraphPayload;

/// Graph store serving subgraphs held in memory, keyed by claim id
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraphStore {
    subgraphs: HashMap<String, SubgraphPayload>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the subgraph for its claim
    pub fn with_subgraph(mut self, subgraph: SubgraphPayload) -> Self {
        self.subgraphs.insert(subgraph.claim_id.clone(), subgraph);
        self
    }

    /// Load a JSON array of subgraphs
    pub fn from_json(json: &str) -> Result<Self, GraphStoreError> {
        let subgraphs: Vec<SubgraphPayload> = serde_json::from_str(json)
            .map_err(|e| GraphStoreError::ParseError(format!("Invalid fixture JSON: {}", e)))?;
        Ok(subgraphs
            .into_iter()
            .fold(Self::new(), |store, s| store.with_subgraph(s)))
    }

    /// Load a JSON fixture file
    pub fn from_file(path: &Path) -> Result<Self, GraphStoreError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            GraphStoreError::Unreachable(format!("{}: {}", path.display(), e))
        })?;
        let store = Self::from_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            subgraphs = store.subgraphs.len(),
            "Loaded graph fixtures"
        );
        Ok(store)
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn fetch_subgraph(&self, claim_id: &str) -> Result<SubgraphPayload, GraphStoreError> {
        self.subgraphs
            .get(claim_id)
            .cloned()
            .ok_or_else(|| GraphStoreError::NotFound(claim_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"[
        {
            "claim_id": "CLM-1",
            "nodes": [
                {"id": "CLM-1", "kind": "claim"},
                {"id": "P-1", "kind": "person", "flagged": true}
            ],
            "edges": [{"source": "CLM-1", "target": "P-1", "relation": "filed_by"}]
        }
    ]"#;

    #[tokio::test]
    async fn test_fetch_known_claim() {
        let store = InMemoryGraphStore::from_json(FIXTURE).unwrap();
        let subgraph = store.fetch_subgraph("CLM-1").await.unwrap();
        assert_eq!(subgraph.nodes.len(), 2);
        assert!(subgraph.nodes[1].flagged);
        assert_eq!(subgraph.edges[0].relation.as_deref(), Some("filed_by"));
    }

    #[tokio::test]
    async fn test_fetch_unknown_claim() {
        let store = InMemoryGraphStore::from_json(FIXTURE).unwrap();
        let result = store.fetch_subgraph("CLM-404").await;
        assert!(matches!(result, Err(GraphStoreError::NotFound(_))));
    }

    #[test]
    fn test_invalid_fixture() {
        let result = InMemoryGraphStore::from_json("{not json");
        assert!(matches!(result, Err(GraphStoreError::ParseError(_))));
    }
}

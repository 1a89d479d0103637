//! Entity subgraph construction
//!
//! Fetches the raw subgraph around a claim, attaches feature vectors and
//! checks the structural guarantees the scorer relies on.

use std::sync::Arc;

use crate::model::{EntityEdge, EntityGraph, EntityNode, SubgraphPayload};
use crate::store::GraphStore;

pub mod error;
pub mod features;

pub use error::SubgraphError;
pub use features::{FeatureSource, ProfileFeatures, StoreFeatures};

/// Builds bounded, connected entity graphs around claims
#[derive(Clone)]
pub struct EntitySubgraphBuilder {
    store: Arc<dyn GraphStore>,
    features: Arc<dyn FeatureSource>,
}

impl EntitySubgraphBuilder {
    pub fn new(store: Arc<dyn GraphStore>, features: Arc<dyn FeatureSource>) -> Self {
        Self { store, features }
    }

    /// Materialize the subgraph within `hop_depth` hops of the claim node
    ///
    /// The graph store must report a subgraph in which every node is reachable
    /// from the claim; nodes further than `hop_depth` are pruned here.
    pub async fn build(
        &self,
        claim_id: &str,
        hop_depth: usize,
    ) -> Result<EntityGraph, SubgraphError> {
        let start_time = std::time::Instant::now();

        let payload = self.store.fetch_subgraph(claim_id).await.map_err(|e| {
            tracing::error!(claim_id = %claim_id, error = %e, "Graph store fetch failed");
            SubgraphError::DataUnavailable(e.to_string())
        })?;

        if payload.claim_id != claim_id {
            return Err(SubgraphError::InsufficientGraphData(format!(
                "store answered with subgraph for {} instead of {}",
                payload.claim_id, claim_id
            )));
        }

        let graph = self.materialize(payload)?;

        if !graph.is_connected() {
            let reachable = graph.hop_distances().len();
            return Err(SubgraphError::InsufficientGraphData(format!(
                "{} of {} nodes are not reachable from claim {}",
                graph.node_count() - reachable,
                graph.node_count(),
                claim_id
            )));
        }

        let fetched_nodes = graph.node_count();
        let graph = graph.retain_within(hop_depth);

        if graph.edge_count() == 0 {
            return Err(SubgraphError::InsufficientGraphData(format!(
                "subgraph for claim {} has no edges",
                claim_id
            )));
        }

        tracing::debug!(
            claim_id = %claim_id,
            hop_depth = hop_depth,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            pruned = fetched_nodes - graph.node_count(),
            elapsed_ms = start_time.elapsed().as_millis(),
            "Entity subgraph built"
        );

        Ok(graph)
    }

    fn materialize(&self, payload: SubgraphPayload) -> Result<EntityGraph, SubgraphError> {
        let mut nodes = Vec::with_capacity(payload.nodes.len());
        for record in payload.nodes {
            let features = self
                .features
                .features_for(&record)
                .map_err(|e| SubgraphError::DataUnavailable(e.to_string()))?;
            nodes.push(EntityNode {
                id: record.id,
                kind: record.kind,
                flagged: record.flagged,
                features,
            });
        }

        let edges = payload
            .edges
            .into_iter()
            .map(|e| EntityEdge {
                source: e.source,
                target: e.target,
                relation: e.relation,
            })
            .collect();

        EntityGraph::new(payload.claim_id, nodes, edges)
            .map_err(|e| SubgraphError::InsufficientGraphData(e.to_string()))
    }
}

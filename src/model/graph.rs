//! Entity-relationship subgraph around a single claim
//!
//! The store hands back a [`SubgraphPayload`] (topology plus optional
//! store-side feature vectors). The subgraph builder turns it into an
//! [`EntityGraph`], an immutable snapshot that the risk scorer reads.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of entity a node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Claim,
    Person,
    Shop,
    Doctor,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Claim => "Claim",
            EntityKind::Person => "Person",
            EntityKind::Shop => "Shop",
            EntityKind::Doctor => "Doctor",
            EntityKind::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Node as reported by a graph store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub kind: EntityKind,
    /// Entity was flagged by an earlier, independent investigation
    #[serde(default)]
    pub flagged: bool,
    /// Feature vector precomputed by the store, if it keeps one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<f64>>,
}

/// Edge as reported by a graph store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

/// Raw subgraph returned by `GraphStore::fetch_subgraph`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgraphPayload {
    pub claim_id: String,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

/// Node of a materialized entity graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityNode {
    pub id: String,
    pub kind: EntityKind,
    pub flagged: bool,
    pub features: Vec<f64>,
}

/// Undirected edge between two distinct nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityEdge {
    pub source: String,
    pub target: String,
    pub relation: Option<String>,
}

/// Structural problems detected while assembling an [`EntityGraph`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum GraphValidationError {
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("edge {from} -- {to} references unknown node {missing}")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },

    #[error("self-loop on node {0}")]
    SelfLoop(String),

    #[error("claim node {0} is not part of the graph")]
    MissingClaimNode(String),

    #[error("node {node} has {found} features, expected {expected}")]
    InconsistentFeatures {
        node: String,
        expected: usize,
        found: usize,
    },
}

/// Immutable entity graph rooted at a claim node
///
/// Nodes and adjacency sets are kept in ordered maps, so every traversal and
/// aggregation sees neighbours sorted by id no matter how the store listed them.
#[derive(Debug, Clone)]
pub struct EntityGraph {
    claim_id: String,
    nodes: BTreeMap<String, EntityNode>,
    edges: Vec<EntityEdge>,
    adjacency: BTreeMap<String, BTreeSet<String>>,
}

impl EntityGraph {
    /// Assemble a graph, checking node uniqueness, edge endpoints and feature dimensions
    pub fn new(
        claim_id: impl Into<String>,
        nodes: Vec<EntityNode>,
        edges: Vec<EntityEdge>,
    ) -> Result<Self, GraphValidationError> {
        let claim_id = claim_id.into();

        let mut by_id = BTreeMap::new();
        let mut feature_dim: Option<usize> = None;
        for node in nodes {
            match feature_dim {
                None => feature_dim = Some(node.features.len()),
                Some(expected) if expected != node.features.len() => {
                    return Err(GraphValidationError::InconsistentFeatures {
                        node: node.id,
                        expected,
                        found: node.features.len(),
                    });
                }
                Some(_) => {}
            }
            if by_id.contains_key(&node.id) {
                return Err(GraphValidationError::DuplicateNode(node.id));
            }
            by_id.insert(node.id.clone(), node);
        }

        if !by_id.contains_key(&claim_id) {
            return Err(GraphValidationError::MissingClaimNode(claim_id));
        }

        let mut adjacency: BTreeMap<String, BTreeSet<String>> = by_id
            .keys()
            .map(|id| (id.clone(), BTreeSet::new()))
            .collect();

        for edge in &edges {
            if edge.source == edge.target {
                return Err(GraphValidationError::SelfLoop(edge.source.clone()));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !by_id.contains_key(endpoint) {
                    return Err(GraphValidationError::DanglingEdge {
                        from: edge.source.clone(),
                        to: edge.target.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
            adjacency
                .entry(edge.source.clone())
                .or_default()
                .insert(edge.target.clone());
            adjacency
                .entry(edge.target.clone())
                .or_default()
                .insert(edge.source.clone());
        }

        Ok(Self {
            claim_id,
            nodes: by_id,
            edges,
            adjacency,
        })
    }

    pub fn claim_id(&self) -> &str {
        &self.claim_id
    }

    pub fn claim_node(&self) -> Option<&EntityNode> {
        self.nodes.get(&self.claim_id)
    }

    pub fn node(&self, id: &str) -> Option<&EntityNode> {
        self.nodes.get(id)
    }

    /// Nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &EntityNode> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Distinct neighbours of a node, ordered by id
    pub fn neighbors<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.adjacency
            .get(id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Shared length of every node's feature vector
    pub fn feature_dim(&self) -> usize {
        self.nodes
            .values()
            .next()
            .map(|n| n.features.len())
            .unwrap_or(0)
    }

    /// Hop distance from the claim node to every reachable node
    pub fn hop_distances(&self) -> BTreeMap<String, usize> {
        let mut distances = BTreeMap::new();
        let mut queue = VecDeque::new();
        distances.insert(self.claim_id.clone(), 0);
        queue.push_back(self.claim_id.clone());

        while let Some(current) = queue.pop_front() {
            let depth = distances[&current];
            for next in self.neighbors(&current) {
                if !distances.contains_key(next) {
                    distances.insert(next.to_string(), depth + 1);
                    queue.push_back(next.to_string());
                }
            }
        }

        distances
    }

    /// True when every node is reachable from the claim node
    pub fn is_connected(&self) -> bool {
        self.hop_distances().len() == self.nodes.len()
    }

    /// Drop every node further than `max_hops` from the claim, with its edges
    pub fn retain_within(self, max_hops: usize) -> Self {
        let distances = self.hop_distances();
        let keep = |id: &str| distances.get(id).is_some_and(|d| *d <= max_hops);

        let nodes: BTreeMap<String, EntityNode> = self
            .nodes
            .into_iter()
            .filter(|(id, _)| keep(id))
            .collect();
        let edges: Vec<EntityEdge> = self
            .edges
            .into_iter()
            .filter(|e| keep(&e.source) && keep(&e.target))
            .collect();
        let adjacency = self
            .adjacency
            .into_iter()
            .filter(|(id, _)| keep(id))
            .map(|(id, set)| {
                let set = set.into_iter().filter(|n| keep(n)).collect();
                (id, set)
            })
            .collect();

        Self {
            claim_id: self.claim_id,
            nodes,
            edges,
            adjacency,
        }
    }
}

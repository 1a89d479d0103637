//! Shared fixtures for unit tests

use crate::model::{EdgeRecord, EntityKind, NodeRecord, SubgraphPayload};

pub const DEMO_CLAIM_ID: &str = "CLM-2025-88X";
pub const DEMO_CLAIM_TEXT: &str =
    "I was doing a food delivery when I hit a bumper at 2 AM near the warehouse.";

pub const CLEAN_CLAIM_ID: &str = "CLM-2025-10A";

pub fn node_record(id: &str, kind: EntityKind, flagged: bool) -> NodeRecord {
    NodeRecord {
        id: id.to_string(),
        kind,
        flagged,
        features: None,
    }
}

pub fn edge_record(source: &str, target: &str) -> EdgeRecord {
    EdgeRecord {
        source: source.to_string(),
        target: target.to_string(),
        relation: None,
    }
}

/// Claimant and a previously flagged person share the same repair shop
pub fn demo_subgraph() -> SubgraphPayload {
    SubgraphPayload {
        claim_id: DEMO_CLAIM_ID.to_string(),
        nodes: vec![
            node_record(DEMO_CLAIM_ID, EntityKind::Claim, false),
            node_record("P-1001", EntityKind::Person, false),
            node_record("S-2001", EntityKind::Shop, false),
            node_record("P-6666", EntityKind::Person, true),
        ],
        edges: vec![
            edge_record(DEMO_CLAIM_ID, "P-1001"),
            edge_record(DEMO_CLAIM_ID, "S-2001"),
            edge_record("P-1001", "S-2001"),
            edge_record("S-2001", "P-6666"),
        ],
    }
}

/// Claimant treated by a doctor, nobody flagged
pub fn clean_subgraph() -> SubgraphPayload {
    SubgraphPayload {
        claim_id: CLEAN_CLAIM_ID.to_string(),
        nodes: vec![
            node_record(CLEAN_CLAIM_ID, EntityKind::Claim, false),
            node_record("P-3001", EntityKind::Person, false),
            node_record("D-4001", EntityKind::Doctor, false),
        ],
        edges: vec![
            edge_record(CLEAN_CLAIM_ID, "P-3001"),
            edge_record(CLEAN_CLAIM_ID, "D-4001"),
            edge_record("P-3001", "D-4001"),
        ],
    }
}

//! Structural explanation of a risk score
//!
//! Walks the graph breadth-first from the claim node and reports every
//! previously flagged entity within reach, along with the path that links it
//! to the claim.

use std::collections::{BTreeMap, VecDeque};

use crate::model::EntityGraph;

/// Path from the claim node to a flagged entity, claim first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedPath {
    pub nodes: Vec<String>,
}

impl FlaggedPath {
    pub fn flagged(&self) -> &str {
        self.nodes.last().map(String::as_str).unwrap_or_default()
    }

    /// Nodes strictly between the claim and the flagged entity
    pub fn intermediaries(&self) -> &[String] {
        match self.nodes.len() {
            0..=2 => &[],
            n => &self.nodes[1..n - 1],
        }
    }
}

/// Shortest path to each flagged node within `max_hops`, in id order of the flagged node
///
/// Ties between equally short paths resolve to the one through the
/// lowest-sorting neighbour.
pub fn flagged_paths(graph: &EntityGraph, max_hops: usize) -> Vec<FlaggedPath> {
    let claim = graph.claim_id();
    let mut parent: BTreeMap<&str, Option<&str>> = BTreeMap::new();
    let mut depth: BTreeMap<&str, usize> = BTreeMap::new();
    let mut queue = VecDeque::new();

    parent.insert(claim, None);
    depth.insert(claim, 0);
    queue.push_back(claim);

    while let Some(current) = queue.pop_front() {
        let d = depth[current];
        if d == max_hops {
            continue;
        }
        for next in graph.neighbors(current) {
            if !parent.contains_key(next) {
                parent.insert(next, Some(current));
                depth.insert(next, d + 1);
                queue.push_back(next);
            }
        }
    }

    parent
        .keys()
        .filter(|id| **id != claim)
        .filter(|id| graph.node(id).is_some_and(|n| n.flagged))
        .map(|id| {
            let mut nodes = vec![id.to_string()];
            let mut cursor = parent[id];
            while let Some(step) = cursor {
                nodes.push(step.to_string());
                cursor = parent[step];
            }
            nodes.reverse();
            FlaggedPath { nodes }
        })
        .collect()
}

/// Sorted, de-duplicated ids of intermediaries and flagged entities
pub fn pattern_nodes(paths: &[FlaggedPath]) -> Vec<String> {
    let mut ids: Vec<String> = paths
        .iter()
        .flat_map(|p| p.nodes.iter().skip(1).cloned())
        .collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Human-readable summary of the flagged pattern around the claim
pub fn describe(graph: &EntityGraph, paths: &[FlaggedPath], max_hops: usize) -> String {
    if paths.is_empty() {
        return format!(
            "No previously flagged entity within {} hops of claim {}; no suspicious network pattern detected.",
            max_hops,
            graph.claim_id()
        );
    }

    let label = |id: &str| match graph.node(id) {
        Some(node) => format!("{} {}", node.kind, id),
        None => id.to_string(),
    };

    let findings: Vec<String> = paths
        .iter()
        .map(|path| {
            let flagged = label(path.flagged());
            let via = path.intermediaries();
            if via.is_empty() {
                format!("directly linked to flagged {}", flagged)
            } else {
                let shared: Vec<String> = via.iter().map(|id| label(id)).collect();
                format!(
                    "linked to flagged {} via shared {} ({})",
                    flagged,
                    shared.join(" -> "),
                    path.nodes.join(" -> ")
                )
            }
        })
        .collect();

    let noun = if paths.len() == 1 { "entity" } else { "entities" };
    format!(
        "Claim {} reaches {} previously flagged {} within {} hops: {}.",
        graph.claim_id(),
        paths.len(),
        noun,
        max_hops,
        findings.join("; ")
    )
}

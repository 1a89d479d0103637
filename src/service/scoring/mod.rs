//! Graph risk scoring
//!
//! Runs the pretrained GraphSAGE-style model over a claim's entity graph and
//! reads the fraud probability off the claim node's final representation.
//! The structural explanation comes from [`pattern`] and does not feed the score.

use crate::model::{EntityGraph, RiskAssessment};

pub mod error;
pub mod model;
pub mod pattern;

pub use error::{ModelError, ScoringError};
pub use model::{Classifier, SageLayer, SageModel};

/// Scores entity graphs with a fixed model
#[derive(Debug, Clone)]
pub struct RiskScorer {
    model: SageModel,
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::new(SageModel::reference())
    }
}

impl RiskScorer {
    pub fn new(model: SageModel) -> Self {
        Self { model }
    }

    /// Fraud probability for the claim node plus a structural explanation
    ///
    /// Deterministic: the same graph (in any node or edge order) always yields
    /// the same score.
    pub fn score(
        &self,
        graph: &EntityGraph,
        hop_depth: usize,
    ) -> Result<RiskAssessment, ScoringError> {
        let start_time = std::time::Instant::now();
        self.check_graph(graph)?;

        let representations = self.model.embed(graph);
        let claim_rep = representations.get(graph.claim_id()).ok_or_else(|| {
            ScoringError::InsufficientGraphData(format!(
                "claim node {} has no representation",
                graph.claim_id()
            ))
        })?;
        let risk_score = self.model.fraud_probability(claim_rep).ok_or_else(|| {
            ScoringError::InsufficientGraphData(format!(
                "feature magnitudes overflow the model for claim {}",
                graph.claim_id()
            ))
        })?;

        let paths = pattern::flagged_paths(graph, hop_depth);
        let structural_reasoning = pattern::describe(graph, &paths, hop_depth);

        tracing::debug!(
            claim_id = %graph.claim_id(),
            risk_score = risk_score,
            flagged_paths = paths.len(),
            elapsed_ms = start_time.elapsed().as_millis(),
            "Risk score computed"
        );

        Ok(RiskAssessment {
            risk_score,
            structural_reasoning,
            flagged_nodes: pattern::pattern_nodes(&paths),
            pattern_paths: paths.into_iter().map(|p| p.nodes).collect(),
        })
    }

    fn check_graph(&self, graph: &EntityGraph) -> Result<(), ScoringError> {
        if graph.claim_node().is_none() {
            return Err(ScoringError::InsufficientGraphData(format!(
                "claim node {} is missing",
                graph.claim_id()
            )));
        }
        if graph.node_count() < 2 {
            return Err(ScoringError::InsufficientGraphData(format!(
                "claim {} has no related entities",
                graph.claim_id()
            )));
        }
        if graph.feature_dim() != self.model.input_dim() {
            return Err(ScoringError::InsufficientGraphData(format!(
                "feature vectors have {} dimensions, model expects {}",
                graph.feature_dim(),
                self.model.input_dim()
            )));
        }
        if let Some(node) = graph
            .nodes()
            .find(|n| n.features.iter().any(|v| !v.is_finite()))
        {
            return Err(ScoringError::InsufficientGraphData(format!(
                "node {} has non-finite features",
                node.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityEdge, EntityKind, EntityNode, NodeRecord, SubgraphPayload};
    use crate::service::subgraph::{FeatureSource, ProfileFeatures, StoreFeatures};
    use crate::testing::{clean_subgraph, demo_subgraph, edge_record, node_record};

    /// Three inputs, two hidden units, weights that are not exact binary fractions
    const FRACTIONAL_MODEL: &str = r#"{
        "layers": [
            {
                "self_weight": [[0.1, 0.37, -0.2], [0.3, -0.15, 0.22]],
                "neighbor_weight": [[0.37, 0.1, 0.41], [-0.2, 0.33, 0.17]],
                "bias": [0.01, -0.03]
            },
            {
                "self_weight": [[0.7, -0.3], [0.2, 0.9]],
                "neighbor_weight": [[0.45, 0.1], [-0.6, 0.37]],
                "bias": [0.05, 0.02]
            }
        ],
        "classifier": {"weight": [[0.3, -0.7], [-0.2, 1.1]], "bias": [0.1, -0.1]}
    }"#;

    /// Single layer amplifying the first input by a million
    const AMPLIFYING_MODEL: &str = r#"{
        "layers": [
            {
                "self_weight": [[1e6, 0.0, 0.0]],
                "neighbor_weight": [[1e6, 0.0, 0.0]],
                "bias": [0.0]
            }
        ],
        "classifier": {"weight": [[-1e6], [1e6]], "bias": [0.0, 0.0]}
    }"#;

    fn stored(id: &str, kind: EntityKind, flagged: bool, features: Vec<f64>) -> NodeRecord {
        NodeRecord {
            id: id.to_string(),
            kind,
            flagged,
            features: Some(features),
        }
    }

    fn to_graph(payload: SubgraphPayload) -> EntityGraph {
        to_graph_with(payload, &ProfileFeatures)
    }

    fn to_graph_with(payload: SubgraphPayload, source: &dyn FeatureSource) -> EntityGraph {
        let nodes = payload
            .nodes
            .iter()
            .map(|r| EntityNode {
                id: r.id.clone(),
                kind: r.kind,
                flagged: r.flagged,
                features: source.features_for(r).unwrap(),
            })
            .collect();
        let edges = payload
            .edges
            .into_iter()
            .map(|e| EntityEdge {
                source: e.source,
                target: e.target,
                relation: e.relation,
            })
            .collect();
        EntityGraph::new(payload.claim_id, nodes, edges).unwrap()
    }

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    #[test]
    fn test_demo_claim_scores_above_threshold() {
        let assessment = RiskScorer::default()
            .score(&to_graph(demo_subgraph()), 2)
            .unwrap();

        // Claim representation is mean(0, 1/3) = 1/6, fraud logit 24/6 - 2 = 2
        assert!((assessment.risk_score - sigmoid(2.0)).abs() < 1e-9);
        assert!(assessment.risk_score > 0.8);
        assert_eq!(assessment.flagged_nodes, vec!["P-6666", "S-2001"]);
        assert_eq!(
            assessment.pattern_paths,
            vec![vec!["CLM-2025-88X", "S-2001", "P-6666"]]
        );
        assert!(assessment.structural_reasoning.contains("via shared Shop S-2001"));
    }

    #[test]
    fn test_clean_claim_scores_low() {
        let assessment = RiskScorer::default()
            .score(&to_graph(clean_subgraph()), 2)
            .unwrap();

        assert!((assessment.risk_score - sigmoid(-2.0)).abs() < 1e-9);
        assert!(!assessment.has_flagged_pattern());
        assert!(assessment.flagged_nodes.is_empty());
    }

    #[test]
    fn test_stronger_pattern_scores_higher() {
        // Claim shares the shop with the flagged person and has no other links
        let payload = SubgraphPayload {
            claim_id: "C-1".to_string(),
            nodes: vec![
                node_record("C-1", EntityKind::Claim, false),
                node_record("P-1", EntityKind::Person, false),
                node_record("S-1", EntityKind::Shop, false),
                node_record("F-1", EntityKind::Person, true),
            ],
            edges: vec![
                edge_record("C-1", "P-1"),
                edge_record("C-1", "S-1"),
                edge_record("S-1", "F-1"),
            ],
        };
        let assessment = RiskScorer::default().score(&to_graph(payload), 2).unwrap();

        // S-1 averages (0 + 1) / 2 after one layer, the claim (0 + 0.5) / 2 after two
        assert!((assessment.risk_score - sigmoid(4.0)).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_order_independent() {
        let forward = demo_subgraph();
        let mut reversed = demo_subgraph();
        reversed.nodes.reverse();
        reversed.edges.reverse();
        for edge in &mut reversed.edges {
            std::mem::swap(&mut edge.source, &mut edge.target);
        }

        let scorer = RiskScorer::default();
        let a = scorer.score(&to_graph(forward), 2).unwrap();
        let b = scorer.score(&to_graph(reversed), 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_score_is_bit_identical_under_reordering() {
        let scorer = RiskScorer::new(SageModel::from_json(FRACTIONAL_MODEL).unwrap());
        // C-1 has four neighbours; F-1 is two hops out through E-1
        let payload = SubgraphPayload {
            claim_id: "C-1".to_string(),
            nodes: vec![
                stored("C-1", EntityKind::Claim, false, vec![0.1, 0.7, -0.3]),
                stored("A-1", EntityKind::Person, false, vec![0.3, -0.1, 0.9]),
                stored("B-1", EntityKind::Shop, false, vec![-0.7, 0.2, 0.1]),
                stored("D-1", EntityKind::Doctor, false, vec![0.6, 0.3, -0.4]),
                stored("E-1", EntityKind::Shop, false, vec![0.2, 0.9, 0.7]),
                stored("F-1", EntityKind::Person, true, vec![1.3, -0.6, 0.1]),
            ],
            edges: vec![
                edge_record("C-1", "A-1"),
                edge_record("C-1", "B-1"),
                edge_record("C-1", "D-1"),
                edge_record("C-1", "E-1"),
                edge_record("A-1", "B-1"),
                edge_record("D-1", "E-1"),
                edge_record("E-1", "F-1"),
            ],
        };

        let baseline = scorer
            .score(&to_graph_with(payload.clone(), &StoreFeatures), 2)
            .unwrap();

        for k in 1..payload.nodes.len() {
            let mut shuffled = payload.clone();
            shuffled.nodes.rotate_left(k);
            let edge_shift = (k * 3) % shuffled.edges.len();
            shuffled.edges.rotate_left(edge_shift);
            if k % 2 == 1 {
                shuffled.edges.reverse();
            }
            for edge in shuffled.edges.iter_mut().step_by(k) {
                std::mem::swap(&mut edge.source, &mut edge.target);
            }

            let assessment = scorer
                .score(&to_graph_with(shuffled, &StoreFeatures), 2)
                .unwrap();
            assert_eq!(
                assessment.risk_score.to_bits(),
                baseline.risk_score.to_bits(),
                "rotation {} changed the score",
                k
            );
            assert_eq!(assessment, baseline);
        }
    }

    #[test]
    fn test_score_stays_in_unit_interval() {
        let scorer = RiskScorer::default();
        for payload in [demo_subgraph(), clean_subgraph()] {
            let score = scorer.score(&to_graph(payload), 2).unwrap().risk_score;
            assert!((0.0..=1.0).contains(&score));
        }

        // Only neighbour is flagged: logit 24 * 2 - 2 saturates towards 1
        let payload = SubgraphPayload {
            claim_id: "C-1".to_string(),
            nodes: vec![
                node_record("C-1", EntityKind::Claim, false),
                node_record("F-1", EntityKind::Person, true),
            ],
            edges: vec![edge_record("C-1", "F-1")],
        };
        let score = scorer.score(&to_graph(payload), 2).unwrap().risk_score;
        assert!((0.0..=1.0).contains(&score));
        assert!(score > 0.99);

        // Large weights and large finite features saturate without overflowing
        let amplifying = RiskScorer::new(SageModel::from_json(AMPLIFYING_MODEL).unwrap());
        let payload = SubgraphPayload {
            claim_id: "C-1".to_string(),
            nodes: vec![
                stored("C-1", EntityKind::Claim, false, vec![1e3, 0.5, 0.5]),
                stored("P-1", EntityKind::Person, false, vec![2e3, 0.1, 0.1]),
            ],
            edges: vec![edge_record("C-1", "P-1")],
        };
        let score = amplifying
            .score(&to_graph_with(payload, &StoreFeatures), 2)
            .unwrap()
            .risk_score;
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_overflowing_features_are_insufficient() {
        // Each node sums its own 1e308 with its neighbour's and overflows in the first layer
        let mut extreme = vec![0.0; 6];
        extreme[0] = 1e308;
        let graph = EntityGraph::new(
            "C-1",
            vec![
                EntityNode {
                    id: "C-1".to_string(),
                    kind: EntityKind::Claim,
                    flagged: false,
                    features: extreme.clone(),
                },
                EntityNode {
                    id: "F-1".to_string(),
                    kind: EntityKind::Person,
                    flagged: true,
                    features: extreme,
                },
            ],
            vec![EntityEdge {
                source: "C-1".to_string(),
                target: "F-1".to_string(),
                relation: None,
            }],
        )
        .unwrap();

        let result = RiskScorer::default().score(&graph, 2);
        assert!(matches!(result, Err(ScoringError::InsufficientGraphData(_))));
    }

    #[test]
    fn test_overflowing_logits_under_loaded_model_are_insufficient() {
        let scorer = RiskScorer::new(SageModel::from_json(AMPLIFYING_MODEL).unwrap());
        // Hidden value 2e306 is finite, the 1e6 classifier weight overflows it
        let payload = SubgraphPayload {
            claim_id: "C-1".to_string(),
            nodes: vec![
                stored("C-1", EntityKind::Claim, false, vec![1e300, 0.0, 0.0]),
                stored("F-1", EntityKind::Person, true, vec![1e300, 0.0, 0.0]),
            ],
            edges: vec![edge_record("C-1", "F-1")],
        };

        let result = scorer.score(&to_graph_with(payload, &StoreFeatures), 2);
        assert!(matches!(
            result,
            Err(ScoringError::InsufficientGraphData(msg)) if msg.contains("overflow")
        ));
    }

    #[test]
    fn test_lone_claim_is_insufficient() {
        let graph = EntityGraph::new(
            "C-1",
            vec![EntityNode {
                id: "C-1".to_string(),
                kind: EntityKind::Claim,
                flagged: false,
                features: vec![0.0; 6],
            }],
            vec![],
        )
        .unwrap();

        let result = RiskScorer::default().score(&graph, 2);
        assert!(matches!(result, Err(ScoringError::InsufficientGraphData(_))));
    }

    #[test]
    fn test_dimension_mismatch_is_insufficient() {
        let graph = EntityGraph::new(
            "C-1",
            vec![
                EntityNode {
                    id: "C-1".to_string(),
                    kind: EntityKind::Claim,
                    flagged: false,
                    features: vec![0.0, 1.0],
                },
                EntityNode {
                    id: "P-1".to_string(),
                    kind: EntityKind::Person,
                    flagged: false,
                    features: vec![1.0, 0.0],
                },
            ],
            vec![EntityEdge {
                source: "C-1".to_string(),
                target: "P-1".to_string(),
                relation: None,
            }],
        )
        .unwrap();

        let result = RiskScorer::default().score(&graph, 2);
        assert!(matches!(
            result,
            Err(ScoringError::InsufficientGraphData(msg)) if msg.contains("model expects 6")
        ));
    }
}

use serde::{Deserialize, Serialize};

/// Outcome of scoring a claim's entity graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Fraud probability in [0, 1]
    pub risk_score: f64,
    /// Human-readable description of the graph pattern behind the score
    pub structural_reasoning: String,
    /// Intermediaries and flagged entities forming the suspicious pattern, sorted by id
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flagged_nodes: Vec<String>,
    /// Paths from the claim node to each flagged entity
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pattern_paths: Vec<Vec<String>>,
}

impl RiskAssessment {
    pub fn has_flagged_pattern(&self) -> bool {
        !self.pattern_paths.is_empty()
    }
}

//! Policy evidence retrieval
//!
//! Matches claim text against an ordered trigger table. Matching is a
//! case-insensitive substring test; each clause is reported once, attributed
//! to the first trigger in table order that selected it.

use std::collections::HashSet;
use std::sync::Arc;

use crate::model::{MatchedClause, PolicyEvidence};

pub mod error;
pub mod rules;

pub use error::PolicyError;
pub use rules::{BuiltinPolicyRules, PolicyRuleSource, YamlPolicyRules};

#[derive(Clone)]
pub struct PolicyEvidenceRetriever {
    source: Arc<dyn PolicyRuleSource>,
}

impl Default for PolicyEvidenceRetriever {
    fn default() -> Self {
        Self::new(Arc::new(BuiltinPolicyRules::default()))
    }
}

impl PolicyEvidenceRetriever {
    pub fn new(source: Arc<dyn PolicyRuleSource>) -> Self {
        Self { source }
    }

    /// Clauses triggered by the claim text, in rule-table order
    ///
    /// Empty text yields empty evidence.
    pub async fn retrieve(&self, claim_text: &str) -> Result<PolicyEvidence, PolicyError> {
        let rules = self.source.load_rules().await?;

        let text = claim_text.to_lowercase();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut clauses = Vec::new();

        for rule in &rules {
            let trigger = rule.trigger.to_lowercase();
            if trigger.is_empty() || !text.contains(&trigger) {
                continue;
            }
            if !seen.insert(rule.clause.clause_id.as_str()) {
                continue;
            }
            clauses.push(MatchedClause {
                clause: rule.clause.clone(),
                trigger: rule.trigger.clone(),
            });
        }

        tracing::debug!(
            rules = rules.len(),
            matched = clauses.len(),
            "Policy evidence retrieved"
        );

        Ok(PolicyEvidence::new(clauses))
    }
}

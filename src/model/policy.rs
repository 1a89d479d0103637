use serde::{Deserialize, Serialize};

/// Whether a clause removes or grants coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseKind {
    /// Voids coverage under the clause's conditions
    Exclusion,
    /// Confirms coverage applies
    Coverage,
}

/// Policy clause a rule points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseDescriptor {
    /// Clause number, e.g. "2.1"
    pub clause_id: String,
    pub text: String,
    pub kind: ClauseKind,
}

/// One row of the rule table: a trigger keyword and the clause it selects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub trigger: String,
    pub clause: ClauseDescriptor,
}

impl PolicyRule {
    pub fn new(trigger: &str, clause_id: &str, text: &str, kind: ClauseKind) -> Self {
        Self {
            trigger: trigger.to_string(),
            clause: ClauseDescriptor {
                clause_id: clause_id.to_string(),
                text: text.to_string(),
                kind,
            },
        }
    }
}

/// A clause matched against the claim text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedClause {
    pub clause: ClauseDescriptor,
    /// Keyword that selected the clause
    pub trigger: String,
}

/// Matched clauses in rule-table priority order; empty means no exclusion was found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyEvidence {
    pub clauses: Vec<MatchedClause>,
}

impl PolicyEvidence {
    pub fn new(clauses: Vec<MatchedClause>) -> Self {
        Self { clauses }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchedClause> {
        self.clauses.iter()
    }

    pub fn has_exclusion(&self) -> bool {
        self.clauses
            .iter()
            .any(|c| c.clause.kind == ClauseKind::Exclusion)
    }

    /// Summary line in the "Policy Scan Results" format used in prompts and reports
    pub fn summary(&self) -> String {
        if self.clauses.is_empty() {
            return "No specific exclusions found. Standard coverage likely applies.".to_string();
        }
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|c| format!("Clause {}: {}", c.clause.clause_id, c.clause.text))
            .collect();
        format!("Policy Scan Results: {}", parts.join("; "))
    }
}

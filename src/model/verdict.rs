use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ClaimRecord, PolicyEvidence, RiskAssessment};

/// Final adjudication outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Approve,
    Reject,
    /// Only ever produced by the external reasoning path
    InvestigateFurther,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Approve => "APPROVE",
            Verdict::Reject => "REJECT",
            Verdict::InvestigateFurther => "INVESTIGATE_FURTHER",
        };
        f.write_str(label)
    }
}

/// Which synthesis path produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    ExternalReasoning,
    DeterministicFallback,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::ExternalReasoning => f.write_str("external_reasoning"),
            Provenance::DeterministicFallback => f.write_str("deterministic_fallback"),
        }
    }
}

/// Terminal artifact of an investigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub verdict: Verdict,
    pub reasoning: String,
    pub provenance: Provenance,
}

/// Complete case file assembled by the investigator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub investigation_id: Uuid,
    pub claim: ClaimRecord,
    pub risk: RiskAssessment,
    pub policy_evidence: PolicyEvidence,
    pub verdict: VerdictRecord,
    pub decided_at: DateTime<Utc>,
}

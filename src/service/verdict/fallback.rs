//! Deterministic verdict rules
//!
//! Used whenever external reasoning is off or does not produce a usable
//! answer. Never yields `INVESTIGATE_FURTHER`.

use crate::model::{
    ClauseKind, PolicyEvidence, Provenance, RiskAssessment, Verdict, VerdictRecord,
};

/// REJECT above the risk threshold, REJECT on any exclusion clause, APPROVE otherwise
pub fn deterministic_verdict(
    risk: &RiskAssessment,
    policy: &PolicyEvidence,
    risk_threshold: f64,
) -> VerdictRecord {
    let (verdict, headline) = if risk.risk_score > risk_threshold {
        (
            Verdict::Reject,
            format!(
                "High risk of organized fraud network detected (risk score {:.4} exceeds threshold {:.2}).",
                risk.risk_score, risk_threshold
            ),
        )
    } else if policy.has_exclusion() {
        let clauses: Vec<String> = policy
            .iter()
            .filter(|c| c.clause.kind == ClauseKind::Exclusion)
            .map(|c| format!("Clause {}: {}", c.clause.clause_id, c.clause.text))
            .collect();
        (
            Verdict::Reject,
            format!("Policy exclusion applies ({}).", clauses.join("; ")),
        )
    } else {
        (
            Verdict::Approve,
            format!(
                "Claim falls within coverage limits and low fraud risk (risk score {:.4} within threshold {:.2}).",
                risk.risk_score, risk_threshold
            ),
        )
    };

    let reasoning = format!(
        "{}\nNetwork analysis: {}\nPolicy analysis: {}",
        headline,
        risk.structural_reasoning,
        policy.summary()
    );

    VerdictRecord {
        verdict,
        reasoning,
        provenance: Provenance::DeterministicFallback,
    }
}

//! Prompts for external verdict reasoning

use crate::model::{PolicyEvidence, RiskAssessment};

pub const ADJUDICATOR_SYSTEM_PROMPT: &str = r#"You are a Senior Insurance Adjudicator.
Your job is to make a final claim decision based on evidence from two independent analyses:
1. Fraud network analysis of the entities connected to the claim
2. Policy coverage analysis of the claim description

Be decisive, objective, and cite the specific evidence provided.
Start your answer with a line of the form "FINAL VERDICT: <APPROVE | REJECT | INVESTIGATE FURTHER>"."#;

/// Case data handed to the adjudicator
pub fn build_evidence_bundle(
    claim_text: &str,
    risk: &RiskAssessment,
    policy: &PolicyEvidence,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("--- CASE DATA ---\n");
    prompt.push_str(&format!("CLAIM: \"{}\"\n\n", claim_text));

    prompt.push_str("EVIDENCE A (Fraud network analysis):\n");
    prompt.push_str(&format!("- Risk Score: {:.4}/1.0\n", risk.risk_score));
    prompt.push_str(&format!("- Finding: {}\n", risk.structural_reasoning));
    if !risk.flagged_nodes.is_empty() {
        prompt.push_str(&format!(
            "- Entities in pattern: {}\n",
            risk.flagged_nodes.join(", ")
        ));
    }
    prompt.push('\n');

    prompt.push_str("EVIDENCE B (Policy coverage analysis):\n");
    prompt.push_str(&format!("- Policy Analysis: {}\n", policy.summary()));
    for matched in policy.iter() {
        prompt.push_str(&format!(
            "  - Clause {} ({:?}, triggered by \"{}\"): {}\n",
            matched.clause.clause_id, matched.clause.kind, matched.trigger, matched.clause.text
        ));
    }
    prompt.push('\n');

    prompt.push_str("--- MISSION ---\n");
    prompt.push_str("1. Determine the Final Verdict (APPROVE, REJECT, or INVESTIGATE FURTHER).\n");
    prompt.push_str("2. Write a formal explanation for the internal file.\n");

    prompt
}

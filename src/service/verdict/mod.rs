//! Verdict synthesis
//!
//! Combines the risk assessment and policy evidence into a verdict. External
//! reasoning is consulted only when enabled and configured; any failure there
//! falls back to [`fallback::deterministic_verdict`].

use std::sync::Arc;

use crate::model::{InvestigationConfig, PolicyEvidence, Provenance, RiskAssessment, VerdictRecord};
use crate::service::llm::ReasoningCapability;

pub mod error;
pub mod fallback;
pub mod prompts;
pub mod validation;

pub use error::ServiceError;

use prompts::{ADJUDICATOR_SYSTEM_PROMPT, build_evidence_bundle};

#[derive(Clone, Default)]
pub struct VerdictSynthesizer {
    capability: Option<Arc<dyn ReasoningCapability>>,
}

impl VerdictSynthesizer {
    pub fn new(capability: Option<Arc<dyn ReasoningCapability>>) -> Self {
        Self { capability }
    }

    /// Synthesizer without an external capability
    pub fn deterministic() -> Self {
        Self::default()
    }

    /// Produce the verdict record; never fails
    pub async fn synthesize(
        &self,
        risk: &RiskAssessment,
        policy: &PolicyEvidence,
        claim_text: &str,
        config: &InvestigationConfig,
    ) -> VerdictRecord {
        if config.external_reasoning_enabled {
            match &self.capability {
                Some(capability) => {
                    match self
                        .reason_externally(capability.as_ref(), risk, policy, claim_text, config)
                        .await
                    {
                        Ok(record) => return record,
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                "External reasoning failed, using deterministic verdict"
                            );
                        }
                    }
                }
                None => {
                    tracing::warn!(
                        "External reasoning enabled but no capability configured, using deterministic verdict"
                    );
                }
            }
        }

        let record = fallback::deterministic_verdict(risk, policy, config.risk_threshold);
        tracing::debug!(
            verdict = %record.verdict,
            provenance = %record.provenance,
            risk_score = risk.risk_score,
            exclusion = policy.has_exclusion(),
            "Deterministic verdict produced"
        );
        record
    }

    async fn reason_externally(
        &self,
        capability: &dyn ReasoningCapability,
        risk: &RiskAssessment,
        policy: &PolicyEvidence,
        claim_text: &str,
        config: &InvestigationConfig,
    ) -> Result<VerdictRecord, ServiceError> {
        let start_time = std::time::Instant::now();
        let bundle = build_evidence_bundle(claim_text, risk, policy);
        let limit = config.external_timeout();

        let response = tokio::time::timeout(
            limit,
            capability.complete(ADJUDICATOR_SYSTEM_PROMPT, &bundle),
        )
        .await
        .map_err(|_| ServiceError::Timeout(limit))??;

        let verdict = validation::parse_verdict(&response)?;

        tracing::info!(
            verdict = %verdict,
            elapsed_ms = start_time.elapsed().as_millis(),
            response_length = response.len(),
            "External verdict accepted"
        );

        Ok(VerdictRecord {
            verdict,
            reasoning: response.trim().to_string(),
            provenance: Provenance::ExternalReasoning,
        })
    }
}

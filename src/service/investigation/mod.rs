//! Investigation orchestration
//!
//! Runs the graph branch (subgraph construction, then scoring) concurrently
//! with policy retrieval, then hands both results to the verdict synthesizer.
//! Failure of either branch aborts the investigation; external reasoning
//! failures never do.

use chrono::Utc;
use uuid::Uuid;

use crate::model::{
    CaseRecord, ClaimRecord, InvestigationConfig, RiskAssessment, VerdictRecord,
};
use crate::service::policy::PolicyEvidenceRetriever;
use crate::service::scoring::RiskScorer;
use crate::service::subgraph::EntitySubgraphBuilder;
use crate::service::verdict::VerdictSynthesizer;

pub mod error;

pub use error::{AbortCause, InvestigationAborted};

/// Owns one instance of each pipeline stage
#[derive(Clone)]
pub struct Investigator {
    builder: EntitySubgraphBuilder,
    scorer: RiskScorer,
    retriever: PolicyEvidenceRetriever,
    synthesizer: VerdictSynthesizer,
}

impl Investigator {
    pub fn new(
        builder: EntitySubgraphBuilder,
        scorer: RiskScorer,
        retriever: PolicyEvidenceRetriever,
        synthesizer: VerdictSynthesizer,
    ) -> Self {
        Self {
            builder,
            scorer,
            retriever,
            synthesizer,
        }
    }

    /// Investigate a claim and return only the verdict
    pub async fn investigate(
        &self,
        claim_id: &str,
        claim_text: &str,
        config: &InvestigationConfig,
    ) -> Result<VerdictRecord, InvestigationAborted> {
        let case = self.investigate_case(claim_id, claim_text, config).await?;
        Ok(case.verdict)
    }

    /// Investigate a claim and return the full case record
    ///
    /// When both branches fail, the graph branch's error is reported.
    pub async fn investigate_case(
        &self,
        claim_id: &str,
        claim_text: &str,
        config: &InvestigationConfig,
    ) -> Result<CaseRecord, InvestigationAborted> {
        let start_time = std::time::Instant::now();
        let investigation_id = Uuid::new_v4();

        tracing::info!(
            claim_id = %claim_id,
            investigation_id = %investigation_id,
            hop_depth = config.hop_depth,
            external_reasoning = config.external_reasoning_enabled,
            "Starting investigation"
        );

        config
            .validate()
            .map_err(|e| self.abort(claim_id, e.into()))?;

        let (risk, policy) = tokio::join!(
            self.assess_risk(claim_id, config.hop_depth),
            self.retriever.retrieve(claim_text)
        );
        let risk = risk.map_err(|cause| self.abort(claim_id, cause))?;
        let policy = policy.map_err(|e| self.abort(claim_id, e.into()))?;

        tracing::info!(
            claim_id = %claim_id,
            risk_score = risk.risk_score,
            flagged_nodes = risk.flagged_nodes.len(),
            policy_clauses = policy.len(),
            "Evidence gathered"
        );

        let verdict = self
            .synthesizer
            .synthesize(&risk, &policy, claim_text, config)
            .await;

        tracing::info!(
            claim_id = %claim_id,
            investigation_id = %investigation_id,
            verdict = %verdict.verdict,
            provenance = %verdict.provenance,
            elapsed_ms = start_time.elapsed().as_millis(),
            "Investigation completed"
        );

        Ok(CaseRecord {
            investigation_id,
            claim: ClaimRecord::new(claim_id, claim_text),
            risk,
            policy_evidence: policy,
            verdict,
            decided_at: Utc::now(),
        })
    }

    async fn assess_risk(
        &self,
        claim_id: &str,
        hop_depth: usize,
    ) -> Result<RiskAssessment, AbortCause> {
        let graph = self.builder.build(claim_id, hop_depth).await?;
        let risk = self.scorer.score(&graph, hop_depth)?;
        Ok(risk)
    }

    fn abort(&self, claim_id: &str, cause: AbortCause) -> InvestigationAborted {
        tracing::error!(claim_id = %claim_id, error = %cause, "Investigation aborted");
        InvestigationAborted::new(claim_id, cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClauseKind, PolicyRule, Provenance, Verdict};
    use crate::service::llm::ReasoningCapability;
    use crate::service::policy::{BuiltinPolicyRules, PolicyError, PolicyRuleSource};
    use crate::service::subgraph::{ProfileFeatures, SubgraphError};
    use crate::service::verdict::ServiceError;
    use crate::store::InMemoryGraphStore;
    use crate::testing::{
        CLEAN_CLAIM_ID, DEMO_CLAIM_ID, DEMO_CLAIM_TEXT, clean_subgraph, demo_subgraph,
    };
    use async_trait::async_trait;
    use std::sync::Arc;

    struct OfflineRules;

    #[async_trait]
    impl PolicyRuleSource for OfflineRules {
        async fn load_rules(&self) -> Result<Vec<PolicyRule>, PolicyError> {
            Err(PolicyError::PolicySourceUnavailable("rule service offline".to_string()))
        }
    }

    struct BrokenReasoner;

    #[async_trait]
    impl ReasoningCapability for BrokenReasoner {
        async fn complete(&self, _system: &str, _bundle: &str) -> Result<String, ServiceError> {
            Err(ServiceError::Request("connection reset".to_string()))
        }
    }

    fn builder() -> EntitySubgraphBuilder {
        let store = InMemoryGraphStore::new()
            .with_subgraph(demo_subgraph())
            .with_subgraph(clean_subgraph());
        EntitySubgraphBuilder::new(Arc::new(store), Arc::new(ProfileFeatures))
    }

    fn investigator() -> Investigator {
        Investigator::new(
            builder(),
            RiskScorer::default(),
            PolicyEvidenceRetriever::default(),
            VerdictSynthesizer::deterministic(),
        )
    }

    #[tokio::test]
    async fn test_demo_claim_is_rejected_by_fallback() {
        let case = investigator()
            .investigate_case(DEMO_CLAIM_ID, DEMO_CLAIM_TEXT, &InvestigationConfig::default())
            .await
            .unwrap();

        assert!(case.risk.risk_score > 0.8);
        assert_eq!(case.risk.flagged_nodes, vec!["P-6666", "S-2001"]);
        assert_eq!(case.policy_evidence.clauses[0].clause.clause_id, "2.1");
        assert_eq!(case.policy_evidence.clauses[0].clause.kind, ClauseKind::Exclusion);
        assert_eq!(case.verdict.verdict, Verdict::Reject);
        assert_eq!(case.verdict.provenance, Provenance::DeterministicFallback);
        assert_eq!(case.claim.id, DEMO_CLAIM_ID);
        assert_eq!(case.investigation_id.get_version_num(), 4);
    }

    #[tokio::test]
    async fn test_clean_claim_is_approved() {
        let verdict = investigator()
            .investigate(
                CLEAN_CLAIM_ID,
                "Minor collision in a supermarket car park.",
                &InvestigationConfig::default(),
            )
            .await
            .unwrap();

        assert_eq!(verdict.verdict, Verdict::Approve);
        assert_eq!(verdict.provenance, Provenance::DeterministicFallback);
    }

    #[tokio::test]
    async fn test_exclusion_rejects_low_risk_claim() {
        let verdict = investigator()
            .investigate(
                CLEAN_CLAIM_ID,
                "Rear-ended while on a delivery run.",
                &InvestigationConfig::default(),
            )
            .await
            .unwrap();

        assert_eq!(verdict.verdict, Verdict::Reject);
        assert!(verdict.reasoning.contains("Policy exclusion applies"));
    }

    #[tokio::test]
    async fn test_unknown_claim_aborts_with_data_unavailable() {
        let err = investigator()
            .investigate("CLM-UNKNOWN", DEMO_CLAIM_TEXT, &InvestigationConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.claim_id, "CLM-UNKNOWN");
        assert!(matches!(
            err.cause,
            AbortCause::Subgraph(SubgraphError::DataUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_policy_source_failure_aborts() {
        let investigator = Investigator::new(
            builder(),
            RiskScorer::default(),
            PolicyEvidenceRetriever::new(Arc::new(OfflineRules)),
            VerdictSynthesizer::deterministic(),
        );

        let err = investigator
            .investigate(DEMO_CLAIM_ID, DEMO_CLAIM_TEXT, &InvestigationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err.cause, AbortCause::Policy(_)));
    }

    #[tokio::test]
    async fn test_external_failure_still_yields_verdict() {
        let investigator = Investigator::new(
            builder(),
            RiskScorer::default(),
            PolicyEvidenceRetriever::new(Arc::new(BuiltinPolicyRules::default())),
            VerdictSynthesizer::new(Some(Arc::new(BrokenReasoner))),
        );
        let config = InvestigationConfig {
            external_reasoning_enabled: true,
            ..Default::default()
        };

        let verdict = investigator
            .investigate(DEMO_CLAIM_ID, DEMO_CLAIM_TEXT, &config)
            .await
            .unwrap();
        assert_eq!(verdict.verdict, Verdict::Reject);
        assert_eq!(verdict.provenance, Provenance::DeterministicFallback);
    }

    #[tokio::test]
    async fn test_invalid_config_aborts() {
        let config = InvestigationConfig {
            hop_depth: 0,
            ..Default::default()
        };
        let err = investigator()
            .investigate(DEMO_CLAIM_ID, DEMO_CLAIM_TEXT, &config)
            .await
            .unwrap_err();
        assert!(matches!(err.cause, AbortCause::Config(_)));
    }
}

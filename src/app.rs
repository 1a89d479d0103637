//! Application state and service initialization
//!
//! Turns a [`Config`] into a ready [`Investigator`]: graph store (with the
//! optional Redis cache), feature source, risk model, policy rule source and,
//! when enabled, the external reasoner.

use std::sync::Arc;

use crate::model::{CaseRecord, Config, FeatureMode, GraphStoreConfig};
use crate::service::investigation::{InvestigationAborted, Investigator};
use crate::service::llm::{OpenAiReasoner, ReasoningCapability};
use crate::service::policy::{
    BuiltinPolicyRules, PolicyEvidenceRetriever, PolicyRuleSource, YamlPolicyRules,
};
use crate::service::scoring::{ModelError, RiskScorer, SageModel};
use crate::service::subgraph::{
    EntitySubgraphBuilder, FeatureSource, ProfileFeatures, StoreFeatures,
};
use crate::service::verdict::VerdictSynthesizer;
use crate::store::{
    CachingGraphStore, GraphStore, GraphStoreError, HttpGraphStore, InMemoryGraphStore,
    SubgraphCache,
};

const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Subgraphs served when no graph store is configured
const DEMO_FIXTURES: &str = include_str!("../data/demo_subgraphs.json");

/// Application state containing the configured investigator
pub struct AppState {
    pub config: Config,
    pub investigator: Investigator,
}

impl AppState {
    /// Initialize all collaborators and build the investigator
    ///
    /// `OPENAI_API_KEY` is only read when external reasoning is enabled.
    pub async fn new(config: Config) -> Result<Self, AppError> {
        config
            .investigation
            .validate()
            .map_err(|e| AppError::InvalidConfig(e.to_string()))?;

        let store = Self::build_graph_store(&config.graph_store).await?;

        let features: Arc<dyn FeatureSource> = match config.scorer.features {
            FeatureMode::Profile => Arc::new(ProfileFeatures),
            FeatureMode::Store => Arc::new(StoreFeatures),
        };

        let model = match &config.scorer.model_path {
            Some(path) => SageModel::from_file(path)?,
            None => SageModel::reference(),
        };

        let rules: Arc<dyn PolicyRuleSource> = match &config.policy.rules_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using policy rules from file");
                Arc::new(YamlPolicyRules::new(path.clone()))
            }
            None => Arc::new(BuiltinPolicyRules::default()),
        };

        let reasoner = Self::build_reasoner(&config, |name| std::env::var(name).ok())?;

        let investigator = Investigator::new(
            EntitySubgraphBuilder::new(store, features),
            RiskScorer::new(model),
            PolicyEvidenceRetriever::new(rules),
            VerdictSynthesizer::new(reasoner),
        );

        Ok(Self {
            config,
            investigator,
        })
    }

    /// Investigate one claim with the configured investigation options
    pub async fn investigate(
        &self,
        claim_id: &str,
        claim_text: &str,
    ) -> Result<CaseRecord, InvestigationAborted> {
        self.investigator
            .investigate_case(claim_id, claim_text, &self.config.investigation)
            .await
    }

    async fn build_graph_store(
        config: &GraphStoreConfig,
    ) -> Result<Arc<dyn GraphStore>, AppError> {
        let store: Arc<dyn GraphStore> = if let Some(base_url) = &config.base_url {
            tracing::info!(base_url = %base_url, "Using remote graph store");
            Arc::new(HttpGraphStore::new(base_url.clone())?)
        } else if let Some(path) = &config.fixture_path {
            Arc::new(InMemoryGraphStore::from_file(path)?)
        } else {
            tracing::info!("No graph store configured, serving bundled demo subgraphs");
            Arc::new(InMemoryGraphStore::from_json(DEMO_FIXTURES)?)
        };

        if !config.cache {
            return Ok(store);
        }

        // Redis is optional; an unreachable server only disables caching
        let cache = match SubgraphCache::new().await {
            Ok(cache) => {
                tracing::info!("Redis subgraph cache enabled");
                Some(cache)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis cache unavailable, running without cache");
                None
            }
        };

        Ok(Arc::new(CachingGraphStore::new(store, cache)))
    }

    fn build_reasoner<F>(
        config: &Config,
        lookup: F,
    ) -> Result<Option<Arc<dyn ReasoningCapability>>, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !config.investigation.external_reasoning_enabled {
            return Ok(None);
        }

        let api_key =
            lookup(ENV_OPENAI_API_KEY).ok_or(AppError::MissingConfig(ENV_OPENAI_API_KEY))?;

        let reasoner =
            OpenAiReasoner::new(&api_key, config.reasoning.model.clone()).map_err(invalid_api_key)?;

        Ok(Some(Arc::new(reasoner)))
    }
}

fn invalid_api_key(e: impl std::fmt::Display) -> AppError {
    AppError::InvalidConfig(format!("Invalid {}: {}", ENV_OPENAI_API_KEY, e))
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Graph store could not be set up
    #[error("Graph store initialization failed: {0}")]
    GraphStore(#[from] GraphStoreError),

    /// Risk model artifact could not be loaded
    #[error("Risk model initialization failed: {0}")]
    Model(#[from] ModelError),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Provenance, Verdict};
    use crate::service::verdict::ServiceError;
    use crate::testing::{DEMO_CLAIM_ID, DEMO_CLAIM_TEXT};

    #[tokio::test]
    async fn test_default_config_runs_demo() {
        let state = AppState::new(Config::default()).await.unwrap();
        let case = state
            .investigate(DEMO_CLAIM_ID, DEMO_CLAIM_TEXT)
            .await
            .unwrap();

        assert_eq!(case.verdict.verdict, Verdict::Reject);
        assert_eq!(case.verdict.provenance, Provenance::DeterministicFallback);
    }

    #[tokio::test]
    async fn test_invalid_threshold_is_rejected() {
        let mut config = Config::default();
        config.investigation.risk_threshold = -0.1;
        assert!(matches!(
            AppState::new(config).await,
            Err(AppError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_reasoner_needs_key_only_when_enabled() {
        let mut config = Config::default();
        assert!(AppState::build_reasoner(&config, |_| None).unwrap().is_none());

        config.investigation.external_reasoning_enabled = true;
        assert!(matches!(
            AppState::build_reasoner(&config, |_| None),
            Err(AppError::MissingConfig("OPENAI_API_KEY"))
        ));
    }

    #[test]
    fn test_invalid_api_key_keeps_client_error() {
        let err = invalid_api_key(ServiceError::Request("malformed header value".to_string()));
        let message = err.to_string();
        assert!(message.contains("Invalid OPENAI_API_KEY"));
        assert!(message.contains("malformed header value"));
    }

    #[tokio::test]
    async fn test_missing_model_file_fails() {
        let mut config = Config::default();
        config.scorer.model_path = Some("does/not/exist/model.json".into());
        assert!(matches!(
            AppState::new(config).await,
            Err(AppError::Model(_))
        ));
    }

    #[tokio::test]
    async fn test_store_features_need_vectors() {
        let mut config = Config::default();
        config.scorer.features = FeatureMode::Store;
        let state = AppState::new(config).await.unwrap();

        // Bundled fixtures carry no vectors, so the graph branch cannot run
        let err = state
            .investigate(DEMO_CLAIM_ID, DEMO_CLAIM_TEXT)
            .await
            .unwrap_err();
        assert_eq!(err.claim_id, DEMO_CLAIM_ID);
    }
}

//! Error types for the investigation pipeline

use thiserror::Error;

use crate::model::ConfigError;
use crate::service::policy::PolicyError;
use crate::service::scoring::ScoringError;
use crate::service::subgraph::SubgraphError;

/// Stage failure that stops an investigation before a verdict exists
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AbortCause {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Subgraph(#[from] SubgraphError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

#[derive(Debug, Error)]
#[error("Investigation of claim {claim_id} aborted: {cause}")]
pub struct InvestigationAborted {
    pub claim_id: String,
    #[source]
    pub cause: AbortCause,
}

impl InvestigationAborted {
    pub fn new(claim_id: impl Into<String>, cause: impl Into<AbortCause>) -> Self {
        Self {
            claim_id: claim_id.into(),
            cause: cause.into(),
        }
    }
}

pub mod claim;
pub mod config;
pub mod graph;
pub mod policy;
pub mod risk;
pub mod verdict;

pub use claim::ClaimRecord;
pub use config::{
    Config, ConfigError, FeatureMode, GraphStoreConfig, InvestigationConfig, PolicyConfig,
    ReasoningConfig, ScorerConfig,
};
pub use graph::{
    EdgeRecord, EntityEdge, EntityGraph, EntityKind, EntityNode, GraphValidationError, NodeRecord,
    SubgraphPayload,
};
pub use policy::{ClauseDescriptor, ClauseKind, MatchedClause, PolicyEvidence, PolicyRule};
pub use risk::RiskAssessment;
pub use verdict::{CaseRecord, Provenance, Verdict, VerdictRecord};

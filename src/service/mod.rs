pub mod investigation;
pub mod llm;
pub mod policy;
pub mod scoring;
pub mod subgraph;
pub mod verdict;

pub use investigation::{AbortCause, InvestigationAborted, Investigator};
pub use llm::{OpenAiReasoner, ReasoningCapability};
pub use policy::PolicyEvidenceRetriever;
pub use scoring::RiskScorer;
pub use subgraph::EntitySubgraphBuilder;
pub use verdict::VerdictSynthesizer;

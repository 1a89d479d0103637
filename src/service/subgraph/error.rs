//! Error types for subgraph construction

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubgraphError {
    /// Graph store or feature source could not supply data
    #[error("Graph data unavailable: {0}")]
    DataUnavailable(String),

    /// Store returned a malformed or too small subgraph
    #[error("Insufficient graph data: {0}")]
    InsufficientGraphData(String),
}

//! Error types for graph risk scoring

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScoringError {
    #[error("Insufficient graph data: {0}")]
    InsufficientGraphData(String),
}

/// Problems loading or validating a model artifact
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model shape: {0}")]
    InvalidShape(String),
}

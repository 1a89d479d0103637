//! Error types for policy evidence retrieval

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PolicyError {
    #[error("Policy rule source unavailable: {0}")]
    PolicySourceUnavailable(String),
}

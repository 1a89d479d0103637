//! Error types for verdict synthesis
//!
//! None of these abort an investigation; each one routes synthesis to the
//! deterministic path.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("External reasoning request failed: {0}")]
    Request(String),

    #[error("External reasoning timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("No unambiguous verdict in external response")]
    UnrecognizedVerdict,
}

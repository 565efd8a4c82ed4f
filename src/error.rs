// Typed errors with thiserror. Surface meaningful messages to JS.
// Only config errors reach the host as failures; everything else is recovered locally.

use thiserror::Error;

use crate::types::{PageIndex, TargetId};

/// Engine error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown target {0:?}")]
    UnknownTarget(TargetId),

    #[error("Invalid geometry for {0:?}")]
    InvalidGeometry(TargetId),

    #[error("Vector asset rejected: {0}")]
    AssetRejected(String),

    #[error("Block {block} on page {page} failed: {message}")]
    BlockFault {
        page: PageIndex,
        block: usize,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LandingError {
    fn from(err: serde_json::Error) -> Self {
        LandingError::Serialization(err.to_string())
    }
}

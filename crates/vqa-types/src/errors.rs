use thiserror::Error;

pub type Result<T, E = VqaError> = std::result::Result<T, E>;

/// Unified error type covering common failure scenarios across subsystems.
#[derive(Debug, Error)]
pub enum VqaError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("vision error: {0}")]
    Vision(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("orchestrator error: {0}")]
    Orchestrator(String),
    #[error("operational error: {0}")]
    Ops(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VqaError {
    /// Per-screen failures that are recorded in the report instead of aborting the batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VqaError::Decode(_))
    }
}

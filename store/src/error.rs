use thiserror::Error;

/// Failures reported by a [`GovernanceStore`](crate::GovernanceStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("governance store unavailable: {0}")]
    Backend(String),

    #[error("failed to encode or decode governance records: {0}")]
    Serialization(String),

    #[error("inconsistent governance record: {0}")]
    Corruption(String),
}

//! Errors raised while validating shared types.

use thiserror::Error;

/// A governance parameter set failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("support_pct must be within 1..=100, got {0}")]
    SupportPct(u8),

    #[error("compensation_fee_pct must be within 0..=100, got {0}")]
    CompensationFeePct(u8),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

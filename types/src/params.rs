//! Governance parameters, set once when the engine is constructed.

use crate::amount::ONE_PERCENT;
use crate::error::ParamsError;
use serde::{Deserialize, Serialize};

/// Parameters of a holographic consensus engine.
///
/// Immutable after the engine is built; there is no governance-of-governance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Share of the total vote-token supply (whole percent) that one side must
    /// strictly exceed for absolute-majority resolution.
    #[serde(default = "default_support_pct")]
    pub support_pct: u8,

    /// Seconds a proposal stays open for voting and staking before boosting.
    #[serde(default = "default_queue_period_secs")]
    pub queue_period_secs: u64,

    /// Length of the boost window in seconds.
    #[serde(default = "default_boost_period_secs")]
    pub boost_period_secs: u64,

    /// Stakes placed within this many seconds of the boost deadline push the
    /// deadline forward by the same amount.
    #[serde(default = "default_boost_period_extension_secs")]
    pub boost_period_extension_secs: u64,

    /// Seconds a proposal must stay pended before it is boosted automatically.
    #[serde(default = "default_pended_boost_period_secs")]
    pub pended_boost_period_secs: u64,

    /// Percentage of each winner's share of the losing pool retained by the engine.
    #[serde(default = "default_compensation_fee_pct")]
    pub compensation_fee_pct: u8,

    /// Confidence threshold in whole percent of the upstake/downstake ratio
    /// (4 means upstake must be at least 4x downstake).
    #[serde(default = "default_confidence_threshold_base")]
    pub confidence_threshold_base: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_support_pct() -> u8 {
    51
}

fn default_queue_period_secs() -> u64 {
    60
}

fn default_boost_period_secs() -> u64 {
    10
}

fn default_boost_period_extension_secs() -> u64 {
    5
}

fn default_pended_boost_period_secs() -> u64 {
    5
}

fn default_compensation_fee_pct() -> u8 {
    1
}

fn default_confidence_threshold_base() -> u64 {
    4
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernanceParams {
    /// Check every bound. Called by the engine constructor.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.support_pct == 0 || self.support_pct > 100 {
            return Err(ParamsError::SupportPct(self.support_pct));
        }
        if self.compensation_fee_pct > 100 {
            return Err(ParamsError::CompensationFeePct(self.compensation_fee_pct));
        }
        if self.queue_period_secs == 0 {
            return Err(ParamsError::ZeroValue("queue_period_secs"));
        }
        if self.boost_period_secs == 0 {
            return Err(ParamsError::ZeroValue("boost_period_secs"));
        }
        if self.confidence_threshold_base == 0 {
            return Err(ParamsError::ZeroValue("confidence_threshold_base"));
        }
        Ok(())
    }

    /// The boost threshold in fixed-point (base 4 → 4e16).
    pub fn confidence_threshold(&self) -> u128 {
        (self.confidence_threshold_base as u128).saturating_mul(ONE_PERCENT)
    }
}

/// Defaults match the reference deployment.
impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            support_pct: default_support_pct(),
            queue_period_secs: default_queue_period_secs(),
            boost_period_secs: default_boost_period_secs(),
            boost_period_extension_secs: default_boost_period_extension_secs(),
            pended_boost_period_secs: default_pended_boost_period_secs(),
            compensation_fee_pct: default_compensation_fee_pct(),
            confidence_threshold_base: default_confidence_threshold_base(),
        }
    }
}

//! JSON scenarios: an initial token distribution plus an ordered list of
//! steps replayed against the engine.
//!
//! ```json
//! {
//!   "start_time": 0,
//!   "vote_balances": { "alice": 60, "bob": 40 },
//!   "stake_balances": { "alice": 100 },
//!   "steps": [
//!     { "op": "create_proposal", "creator": "alice", "metadata": "raise fee" },
//!     { "op": "stake", "proposal": 0, "staker": "alice", "amount": 10, "side": "up" },
//!     { "op": "advance", "secs": 5 },
//!     { "op": "vote", "proposal": 0, "voter": "alice", "support": true }
//!   ]
//! }
//! ```

use holo_types::{Amount, ProposalId, StakeSide};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::DaemonError;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    /// Clock reading, in seconds, before the first step.
    #[serde(default)]
    pub start_time: u64,

    /// Initial vote-token balances.
    #[serde(default)]
    pub vote_balances: BTreeMap<String, Amount>,

    /// Initial stake-token balances. Each holder also approves the escrow
    /// account for their full balance.
    #[serde(default)]
    pub stake_balances: BTreeMap<String, Amount>,

    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json_str(s: &str) -> Result<Self, DaemonError> {
        serde_json::from_str(s).map_err(|e| DaemonError::Scenario(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, DaemonError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DaemonError::Scenario(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&content)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Up,
    Down,
}

impl From<Side> for StakeSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Up => StakeSide::Up,
            Side::Down => StakeSide::Down,
        }
    }
}

/// One scenario operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    CreateProposal {
        creator: String,
        #[serde(default)]
        metadata: String,
    },
    Vote {
        proposal: ProposalId,
        voter: String,
        support: bool,
    },
    Stake {
        proposal: ProposalId,
        staker: String,
        amount: Amount,
        side: Side,
    },
    Unstake {
        proposal: ProposalId,
        staker: String,
        amount: Amount,
        side: Side,
    },
    Boost {
        proposal: ProposalId,
    },
    Finalize {
        proposal: ProposalId,
    },
    Expire {
        proposal: ProposalId,
    },
    WithdrawReward {
        proposal: ProposalId,
        staker: String,
    },
    CollectFees {
        to: String,
    },
    /// Set the stake-token allowance `owner` grants the escrow account.
    Approve {
        owner: String,
        amount: Amount,
    },
    MintVote {
        to: String,
        amount: Amount,
    },
    BurnVote {
        from: String,
        amount: Amount,
    },
    MintStake {
        to: String,
        amount: Amount,
    },
    /// Move the clock forward.
    Advance {
        secs: u64,
    },
}

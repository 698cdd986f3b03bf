//! Per-account vote and stake records.

use crate::amount::Amount;
use serde::{Deserialize, Serialize};

/// A voter's recorded position on a proposal.
///
/// Numeric codes are observable: `Absent = 0`, `Yea = 1`, `Nay = 2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteChoice {
    #[default]
    Absent,
    Yea,
    Nay,
}

impl VoteChoice {
    pub fn from_support(support: bool) -> Self {
        if support {
            Self::Yea
        } else {
            Self::Nay
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Absent => 0,
            Self::Yea => 1,
            Self::Nay => 2,
        }
    }
}

/// A cast vote: the side and the weight frozen at the time of casting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub choice: VoteChoice,
    pub weight: Amount,
}

/// Which outcome a stake predicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StakeSide {
    /// Predicts the proposal passes.
    Up,
    /// Predicts the proposal fails.
    Down,
}

impl StakeSide {
    /// The stake side that wins when the vote resolves to `choice`.
    pub fn backing(choice: VoteChoice) -> Option<Self> {
        match choice {
            VoteChoice::Yea => Some(Self::Up),
            VoteChoice::Nay => Some(Self::Down),
            VoteChoice::Absent => None,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// A staker's outstanding stake on one proposal. Both sides may be non-zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    pub upstake: Amount,
    pub downstake: Amount,
}

impl StakeRecord {
    pub fn on(&self, side: StakeSide) -> Amount {
        match side {
            StakeSide::Up => self.upstake,
            StakeSide::Down => self.downstake,
        }
    }

    pub fn on_mut(&mut self, side: StakeSide) -> &mut Amount {
        match side {
            StakeSide::Up => &mut self.upstake,
            StakeSide::Down => &mut self.downstake,
        }
    }
}

//! Proposal records and their lifecycle state.

use crate::account::AccountId;
use crate::amount::Amount;
use crate::record::{StakeSide, VoteChoice};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential proposal identifier, starting at 0.
pub type ProposalId = u64;

/// Lifecycle state of a proposal.
///
/// Numeric codes are observable and stable: `Queued = 0`, `Unpended = 1`,
/// `Pended = 2`, `Boosted = 3`, `Resolved = 4`, `Expired = 5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    /// Open for voting and staking, confidence below threshold.
    Queued,
    /// Was pended, but confidence dropped back below threshold.
    Unpended,
    /// Confidence is at or above threshold; waiting out the pended period.
    Pended,
    /// On the relative-majority track until the boost deadline.
    Boosted,
    /// Finalized.
    Resolved,
    /// Queue period lapsed without resolution or boosting.
    Expired,
}

impl ProposalState {
    pub fn code(&self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Unpended => 1,
            Self::Pended => 2,
            Self::Boosted => 3,
            Self::Resolved => 4,
            Self::Expired => 5,
        }
    }

    /// Whether the proposal is still waiting in the queue (not boosted, not closed).
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued | Self::Unpended | Self::Pended)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Unpended => "unpended",
            Self::Pended => "pended",
            Self::Boosted => "boosted",
            Self::Resolved => "resolved",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pool snapshot captured when a boosted proposal is finalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Total stake on the winning side at finalization.
    pub winning_pool: Amount,
    /// Total stake on the losing side at finalization (forfeited).
    pub losing_pool: Amount,
    /// Sum of payouts made so far.
    pub paid_out: Amount,
    /// Sum of compensation fees retained so far.
    pub fees_retained: Amount,
    /// Losing stake left over after every winner's floored share, credited to
    /// the retained fees at finalization. The whole losing pool when nobody
    /// staked on the winning side.
    pub dust: Amount,
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub creator: AccountId,
    /// Opaque description.
    pub metadata: String,
    pub start_date: Timestamp,
    pub state: ProposalState,
    pub yea: Amount,
    pub nay: Amount,
    pub upstake: Amount,
    pub downstake: Amount,
    /// Set once when boosting happens, never unset.
    pub boosted: bool,
    /// Set once at finalization, never unset.
    pub finalized: bool,
    /// When the proposal last entered `Pended`.
    pub pended_date: Option<Timestamp>,
    pub boost_timestamp: Option<Timestamp>,
    /// End of the boost window, extendable by late stakes.
    pub boost_deadline: Option<Timestamp>,
    pub winning_side: Option<VoteChoice>,
    pub settlement: Option<Settlement>,
}

impl Proposal {
    pub fn new(id: ProposalId, creator: AccountId, metadata: String, now: Timestamp) -> Self {
        Self {
            id,
            creator,
            metadata,
            start_date: now,
            state: ProposalState::Queued,
            yea: 0,
            nay: 0,
            upstake: 0,
            downstake: 0,
            boosted: false,
            finalized: false,
            pended_date: None,
            boost_timestamp: None,
            boost_deadline: None,
            winning_side: None,
            settlement: None,
        }
    }

    pub fn stake_on(&self, side: StakeSide) -> Amount {
        match side {
            StakeSide::Up => self.upstake,
            StakeSide::Down => self.downstake,
        }
    }

    pub fn stake_on_mut(&mut self, side: StakeSide) -> &mut Amount {
        match side {
            StakeSide::Up => &mut self.upstake,
            StakeSide::Down => &mut self.downstake,
        }
    }

    /// Whether the queue period has lapsed at `now`.
    pub fn queue_elapsed(&self, queue_period_secs: u64, now: Timestamp) -> bool {
        self.start_date.has_expired(queue_period_secs, now)
    }

    /// Whether the boost window has closed at `now`. False for unboosted proposals.
    pub fn boost_elapsed(&self, now: Timestamp) -> bool {
        self.boost_deadline.is_some_and(|deadline| now >= deadline)
    }

    /// The state as observed at `now`: an unboosted, unfinalized proposal whose
    /// queue period has lapsed reads as `Expired` even before it is stored so.
    pub fn effective_state(&self, queue_period_secs: u64, now: Timestamp) -> ProposalState {
        if self.state.is_queued() && self.queue_elapsed(queue_period_secs, now) {
            ProposalState::Expired
        } else {
            self.state
        }
    }
}

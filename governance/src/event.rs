//! Events emitted by the engine for subscribers.

use holo_types::{AccountId, Amount, ProposalId, ProposalState};
use serde::Serialize;

/// Observable side effects of engine operations.
///
/// Events of one operation are published in order, and only after the
/// operation has committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum GovernanceEvent {
    ProposalCreated {
        id: ProposalId,
        creator: AccountId,
        metadata: String,
    },
    VoteCasted {
        id: ProposalId,
        voter: AccountId,
        support: bool,
        weight: Amount,
    },
    UpstakeProposal {
        id: ProposalId,
        staker: AccountId,
        amount: Amount,
    },
    DownstakeProposal {
        id: ProposalId,
        staker: AccountId,
        amount: Amount,
    },
    WithdrawUpstake {
        id: ProposalId,
        staker: AccountId,
        amount: Amount,
    },
    WithdrawDownstake {
        id: ProposalId,
        staker: AccountId,
        amount: Amount,
    },
    ProposalStateChanged {
        id: ProposalId,
        new_state: ProposalState,
    },
    FinalizeProposal {
        id: ProposalId,
    },
    /// Settlement payout to a winning staker, net of the retained fee.
    RewardWithdrawn {
        id: ProposalId,
        staker: AccountId,
        payout: Amount,
        fee: Amount,
    },
    FeesCollected {
        to: AccountId,
        amount: Amount,
    },
}

impl GovernanceEvent {
    /// The proposal this event concerns, if any.
    pub fn proposal_id(&self) -> Option<ProposalId> {
        match self {
            Self::ProposalCreated { id, .. }
            | Self::VoteCasted { id, .. }
            | Self::UpstakeProposal { id, .. }
            | Self::DownstakeProposal { id, .. }
            | Self::WithdrawUpstake { id, .. }
            | Self::WithdrawDownstake { id, .. }
            | Self::ProposalStateChanged { id, .. }
            | Self::FinalizeProposal { id }
            | Self::RewardWithdrawn { id, .. } => Some(*id),
            Self::FeesCollected { .. } => None,
        }
    }
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the committing thread; keep handlers fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&GovernanceEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &GovernanceEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#![allow(dead_code)]

use holo_governance::{GovernanceEngine, GovernanceEvent, Ledgers};
use holo_ledger::{MemoryToken, TokenLedger};
use holo_nullables::{NullClock, NullStore};
use holo_store::GovernanceStore;
use holo_types::{AccountId, Amount, GovernanceParams, ProposalId, ProposalState};
use std::sync::Arc;

pub const START: u64 = 1_000;

pub fn acct(name: &str) -> AccountId {
    AccountId::new(name)
}

/// An engine wired to in-memory ledgers, store and clock, with handles kept
/// for inspection.
pub struct Harness {
    pub engine: GovernanceEngine,
    pub vote: Arc<MemoryToken>,
    pub stake: Arc<MemoryToken>,
    pub store: Arc<NullStore>,
    pub clock: Arc<NullClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_params(GovernanceParams::default())
    }

    pub fn with_params(params: GovernanceParams) -> Self {
        let vote = Arc::new(MemoryToken::new("VOTE"));
        let stake = Arc::new(MemoryToken::new("STK"));
        let store = Arc::new(NullStore::new());
        let clock = Arc::new(NullClock::new(START));
        let engine = GovernanceEngine::new(
            params,
            Ledgers {
                vote: vote.clone(),
                stake: stake.clone(),
            },
            store.clone(),
            clock.clone(),
            acct("escrow"),
        )
        .unwrap();
        Self {
            engine,
            vote,
            stake,
            store,
            clock,
        }
    }

    /// Mint vote tokens to each `(name, balance)`.
    pub fn voters(&self, holders: &[(&str, Amount)]) {
        for (name, balance) in holders {
            self.vote.mint(&acct(name), *balance).unwrap();
        }
    }

    /// Mint stake tokens to `name` and approve the escrow for all of them.
    pub fn staker(&self, name: &str, balance: Amount) {
        self.stake.mint(&acct(name), balance).unwrap();
        self.stake.approve(&acct(name), &acct("escrow"), balance);
    }

    pub fn propose(&mut self) -> ProposalId {
        self.engine.create_proposal(&acct("creator"), "proposal").unwrap()
    }

    pub fn stake_balance(&self, name: &str) -> Amount {
        self.stake.balance_of(&acct(name))
    }

    pub fn escrow_balance(&self) -> Amount {
        self.stake.balance_of(&acct("escrow"))
    }

    pub fn state(&self, id: ProposalId) -> ProposalState {
        self.engine.get_proposal(id).unwrap().state
    }

    /// The stored state, without the lazy expiry applied by `get_proposal`.
    pub fn store_state(&self, id: ProposalId) -> ProposalState {
        self.store.get_proposal(id).unwrap().unwrap().state
    }

    /// States announced by `ProposalStateChanged` events since the last drain.
    pub fn drained_states(&mut self) -> Vec<ProposalState> {
        self.engine
            .drain_events()
            .into_iter()
            .filter_map(|event| match event {
                GovernanceEvent::ProposalStateChanged { new_state, .. } => Some(new_state),
                _ => None,
            })
            .collect()
    }
}

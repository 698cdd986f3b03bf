//! Core governance engine: owns the parameters, the ledgers and the store, and
//! commits the staged transactions built by the voting, staking, boost,
//! resolution and settlement components.

use crate::error::GovernanceError;
use crate::event::{EventBus, GovernanceEvent};
use crate::txn::Txn;
use holo_ledger::TokenLedger;
use holo_store::GovernanceStore;
use holo_types::{
    AccountId, Amount, Clock, GovernanceParams, Proposal, ProposalId, StakeRecord, Timestamp,
};
use std::sync::Arc;

/// The two token ledgers the engine reads and moves funds on.
#[derive(Clone)]
pub struct Ledgers {
    /// Voting weight is the current balance on this ledger.
    pub vote: Arc<dyn TokenLedger>,
    /// Stakes are escrowed on this ledger.
    pub stake: Arc<dyn TokenLedger>,
}

/// The holographic consensus engine.
///
/// Every mutating operation takes `&mut self` and is all-or-nothing: either
/// every record write, fund movement and event of the operation happens, or
/// none does.
pub struct GovernanceEngine {
    pub(crate) params: GovernanceParams,
    pub(crate) ledgers: Ledgers,
    pub(crate) store: Arc<dyn GovernanceStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) escrow: AccountId,
    events: EventBus,
    /// Committed events not yet drained by the host.
    pending_events: Vec<GovernanceEvent>,
}

impl GovernanceEngine {
    /// Build an engine. Fails with `InvalidParams` if any parameter is out of bounds.
    pub fn new(
        params: GovernanceParams,
        ledgers: Ledgers,
        store: Arc<dyn GovernanceStore>,
        clock: Arc<dyn Clock>,
        escrow: AccountId,
    ) -> Result<Self, GovernanceError> {
        params.validate()?;
        tracing::info!(
            escrow = %escrow,
            support_pct = params.support_pct,
            queue_period_secs = params.queue_period_secs,
            boost_period_secs = params.boost_period_secs,
            "governance engine initialised"
        );
        Ok(Self {
            params,
            ledgers,
            store,
            clock,
            escrow,
            events: EventBus::new(),
            pending_events: Vec::new(),
        })
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn escrow_account(&self) -> &AccountId {
        &self.escrow
    }

    /// Register a listener invoked for every committed event.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    /// Take all committed events since the last drain, in commit order.
    pub fn drain_events(&mut self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ── Proposal store ──────────────────────────────────────────────────

    /// Create a proposal with the next sequential id.
    pub fn create_proposal(
        &mut self,
        creator: &AccountId,
        metadata: impl Into<String>,
    ) -> Result<ProposalId, GovernanceError> {
        let mut txn = Txn::new(self.clock.now());
        let id = self.store.proposal_count()?;
        let proposal = Proposal::new(id, creator.clone(), metadata.into(), txn.now);

        txn.create_proposal(&proposal);
        txn.emit(GovernanceEvent::ProposalCreated {
            id,
            creator: proposal.creator.clone(),
            metadata: proposal.metadata.clone(),
        });
        self.commit(txn)?;

        tracing::info!(proposal = id, creator = %creator, "proposal created");
        Ok(id)
    }

    /// The proposal as observed now (queue-lapsed proposals read as `Expired`).
    pub fn get_proposal(&self, id: ProposalId) -> Result<Proposal, GovernanceError> {
        let mut proposal = self.load(id)?;
        proposal.state = proposal.effective_state(self.params.queue_period_secs, self.clock.now());
        Ok(proposal)
    }

    pub fn exists(&self, id: ProposalId) -> Result<bool, GovernanceError> {
        Ok(id < self.store.proposal_count()?)
    }

    pub fn num_proposals(&self) -> Result<u64, GovernanceError> {
        Ok(self.store.proposal_count()?)
    }

    // ── Internals shared by the components ──────────────────────────────

    pub(crate) fn load(&self, id: ProposalId) -> Result<Proposal, GovernanceError> {
        self.store
            .get_proposal(id)?
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub(crate) fn stake_record(
        &self,
        id: ProposalId,
        staker: &AccountId,
    ) -> Result<StakeRecord, GovernanceError> {
        Ok(self.store.get_stake(id, staker)?.unwrap_or_default())
    }

    /// Voting and staking are open until finalization and, depending on the
    /// track, until the queue period or the boost window ends.
    pub(crate) fn ensure_open(
        &self,
        proposal: &Proposal,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let closed = if proposal.finalized {
            true
        } else if proposal.boosted {
            proposal.boost_elapsed(now)
        } else {
            !proposal.state.is_queued()
                || proposal.queue_elapsed(self.params.queue_period_secs, now)
        };
        if closed {
            return Err(GovernanceError::ProposalClosed(proposal.id));
        }
        Ok(())
    }

    /// Commit a transaction that moves no funds.
    pub(crate) fn commit(&mut self, txn: Txn) -> Result<(), GovernanceError> {
        let (batch, _, events) = txn.into_parts();
        self.store.apply(batch)?;
        self.publish(events);
        Ok(())
    }

    /// Commit a transaction whose deposit into escrow has already been pulled.
    /// If the store rejects the writes, the deposit is returned to `depositor`.
    pub(crate) fn commit_after_deposit(
        &mut self,
        txn: Txn,
        depositor: &AccountId,
        amount: Amount,
    ) -> Result<(), GovernanceError> {
        let (batch, _, events) = txn.into_parts();
        if let Err(err) = self.store.apply(batch) {
            tracing::warn!(
                account = %depositor,
                amount,
                error = %err,
                "store rejected staged writes, refunding deposit"
            );
            if let Err(refund_err) = self.ledgers.stake.transfer(&self.escrow, depositor, amount) {
                tracing::error!(
                    account = %depositor,
                    amount,
                    error = %refund_err,
                    "compensating refund failed"
                );
            }
            return Err(err.into());
        }
        self.publish(events);
        Ok(())
    }

    /// Commit a transaction, then pay `amount` out of escrow to `payee`.
    /// If the payout fails, the prior values of every written record are restored.
    pub(crate) fn commit_then_pay(
        &mut self,
        txn: Txn,
        payee: &AccountId,
        amount: Amount,
    ) -> Result<(), GovernanceError> {
        let (batch, undo, events) = txn.into_parts();
        self.store.apply(batch)?;
        if let Err(err) = self.ledgers.stake.transfer(&self.escrow, payee, amount) {
            tracing::warn!(
                account = %payee,
                amount,
                error = %err,
                "payout failed, reverting staged writes"
            );
            if let Err(store_err) = self.store.apply(undo) {
                tracing::error!(error = %store_err, "reverting staged writes failed");
            }
            return Err(err.into());
        }
        self.publish(events);
        Ok(())
    }

    fn publish(&mut self, events: Vec<GovernanceEvent>) {
        for event in events {
            self.events.emit(&event);
            self.pending_events.push(event);
        }
    }
}

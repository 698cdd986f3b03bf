//! Staged transactions.
//!
//! An operation stages every record write and every event here while it checks
//! preconditions against working copies. Nothing reaches the store or the event
//! bus until the engine commits the transaction; dropping it discards everything.
//! Writes that replace an existing record also stage the prior value, so a
//! committed transaction can be reverted if a payout transfer fails afterwards.

use crate::event::GovernanceEvent;
use holo_store::WriteBatch;
use holo_types::{AccountId, Amount, Proposal, ProposalId, StakeRecord, Timestamp, VoteRecord};

pub(crate) struct Txn {
    pub now: Timestamp,
    batch: WriteBatch,
    undo: WriteBatch,
    events: Vec<GovernanceEvent>,
}

impl Txn {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now,
            batch: WriteBatch::new(),
            undo: WriteBatch::new(),
            events: Vec::new(),
        }
    }

    pub fn create_proposal(&mut self, proposal: &Proposal) {
        self.batch.put_proposal(proposal.clone());
    }

    pub fn put_proposal(&mut self, after: &Proposal, before: &Proposal) {
        self.batch.put_proposal(after.clone());
        self.undo.put_proposal(before.clone());
    }

    pub fn put_vote(&mut self, id: ProposalId, voter: &AccountId, record: VoteRecord) {
        self.batch.put_vote(id, voter.clone(), record);
    }

    pub fn put_stake(
        &mut self,
        id: ProposalId,
        staker: &AccountId,
        after: StakeRecord,
        before: StakeRecord,
    ) {
        self.batch.put_stake(id, staker.clone(), after);
        self.undo.put_stake(id, staker.clone(), before);
    }

    pub fn put_retained_fees(&mut self, after: Amount, before: Amount) {
        self.batch.put_retained_fees(after);
        self.undo.put_retained_fees(before);
    }

    pub fn emit(&mut self, event: GovernanceEvent) {
        self.events.push(event);
    }

    /// Split into (writes, compensating writes, events).
    pub fn into_parts(self) -> (WriteBatch, WriteBatch, Vec<GovernanceEvent>) {
        (self.batch, self.undo, self.events)
    }
}

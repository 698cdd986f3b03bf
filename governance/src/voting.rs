//! Token-weighted voting.
//!
//! Weight is the voter's vote-token balance at the moment of the call. A voter
//! has at most one live vote per proposal: re-voting first retracts the
//! recorded weight from the recorded side.

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::event::GovernanceEvent;
use crate::txn::Txn;
use holo_types::{AccountId, Amount, Proposal, ProposalId, VoteChoice, VoteRecord};

impl GovernanceEngine {
    /// Cast (or recast) a vote, then check for an absolute majority.
    pub fn vote(
        &mut self,
        id: ProposalId,
        voter: &AccountId,
        support: bool,
    ) -> Result<(), GovernanceError> {
        let mut txn = Txn::new(self.clock.now());
        let before = self.load(id)?;
        self.ensure_open(&before, txn.now)?;

        let weight = self.ledgers.vote.balance_of(voter);
        if weight == 0 {
            return Err(GovernanceError::NoVotingPower(voter.to_string()));
        }

        let mut proposal = before.clone();
        if let Some(previous) = self.store.get_vote(id, voter)? {
            if let Some(tally) = tally_mut(&mut proposal, previous.choice) {
                *tally = tally
                    .checked_sub(previous.weight)
                    .ok_or(GovernanceError::Overflow)?;
            }
        }

        let choice = VoteChoice::from_support(support);
        if let Some(tally) = tally_mut(&mut proposal, choice) {
            *tally = tally.checked_add(weight).ok_or(GovernanceError::Overflow)?;
        }

        txn.put_vote(id, voter, VoteRecord { choice, weight });
        txn.emit(GovernanceEvent::VoteCasted {
            id,
            voter: voter.clone(),
            support,
            weight,
        });
        tracing::debug!(proposal = id, voter = %voter, support, weight, "vote cast");

        self.resolve_on_absolute_majority(&mut proposal, &mut txn)?;
        txn.put_proposal(&proposal, &before);
        self.commit(txn)
    }

    /// The voter's current position, `Absent` if they never voted.
    pub fn get_vote(&self, id: ProposalId, voter: &AccountId) -> Result<VoteChoice, GovernanceError> {
        self.load(id)?;
        Ok(self
            .store
            .get_vote(id, voter)?
            .map(|record| record.choice)
            .unwrap_or_default())
    }
}

fn tally_mut(proposal: &mut Proposal, choice: VoteChoice) -> Option<&mut Amount> {
    match choice {
        VoteChoice::Yea => Some(&mut proposal.yea),
        VoteChoice::Nay => Some(&mut proposal.nay),
        VoteChoice::Absent => None,
    }
}

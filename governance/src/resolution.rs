//! Resolution: absolute-majority fast path, relative majority for boosted
//! proposals, and expiry of proposals that lapse in the queue.

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::event::GovernanceEvent;
use crate::settlement::capture_settlement;
use crate::txn::Txn;
use holo_types::{mul_div_floor, Proposal, ProposalId, ProposalState, VoteChoice};

impl GovernanceEngine {
    /// Finalize a proposal.
    ///
    /// Unboosted proposals need an absolute majority of the current vote-token
    /// supply. Boosted proposals resolve by relative majority once the boost
    /// window has closed; a tie goes to nay.
    pub fn finalize_proposal(&mut self, id: ProposalId) -> Result<(), GovernanceError> {
        let mut txn = Txn::new(self.clock.now());
        let before = self.load(id)?;
        if before.finalized {
            return Err(GovernanceError::AlreadyFinalized(id));
        }

        let winner = if before.boosted {
            if !before.boost_elapsed(txn.now) {
                return Err(GovernanceError::BoostPeriodActive(id));
            }
            if before.yea > before.nay {
                VoteChoice::Yea
            } else {
                VoteChoice::Nay
            }
        } else {
            if before.effective_state(self.params.queue_period_secs, txn.now)
                == ProposalState::Expired
            {
                return Err(GovernanceError::ProposalClosed(id));
            }
            self.absolute_winner(&before)
                .ok_or(GovernanceError::NotEnoughAbsoluteSupport(id))?
        };

        let mut proposal = before.clone();
        self.resolve(&mut proposal, winner, &mut txn)?;
        txn.put_proposal(&proposal, &before);
        self.commit(txn)
    }

    /// Record a lapsed, unboosted proposal as `Expired`.
    pub fn expire_proposal(&mut self, id: ProposalId) -> Result<(), GovernanceError> {
        let mut txn = Txn::new(self.clock.now());
        let before = self.load(id)?;
        if before.finalized {
            return Err(GovernanceError::AlreadyFinalized(id));
        }
        if before.boosted {
            return Err(GovernanceError::AlreadyBoosted(id));
        }
        if before.state == ProposalState::Expired {
            return Err(GovernanceError::ProposalClosed(id));
        }
        if !before.queue_elapsed(self.params.queue_period_secs, txn.now) {
            return Err(GovernanceError::ProposalNotExpired(id));
        }

        let mut proposal = before.clone();
        proposal.state = ProposalState::Expired;
        proposal.pended_date = None;
        self.change_state(&proposal, ProposalState::Expired, &mut txn);
        txn.put_proposal(&proposal, &before);
        self.commit(txn)
    }

    /// Resolve inside the current transaction if either side holds more than
    /// `support_pct` of the vote-token supply.
    pub(crate) fn resolve_on_absolute_majority(
        &self,
        proposal: &mut Proposal,
        txn: &mut Txn,
    ) -> Result<(), GovernanceError> {
        match self.absolute_winner(proposal) {
            Some(winner) => self.resolve(proposal, winner, txn),
            None => Ok(()),
        }
    }

    /// `side * 100 > support_pct * supply`, compared as
    /// `side > floor(supply * support_pct / 100)`.
    fn absolute_winner(&self, proposal: &Proposal) -> Option<VoteChoice> {
        let supply = self.ledgers.vote.total_supply();
        if supply == 0 {
            return None;
        }
        let bar = mul_div_floor(supply, self.params.support_pct as u128, 100).unwrap_or(u128::MAX);
        if proposal.yea > bar {
            Some(VoteChoice::Yea)
        } else if proposal.nay > bar {
            Some(VoteChoice::Nay)
        } else {
            None
        }
    }

    fn resolve(
        &self,
        proposal: &mut Proposal,
        winner: VoteChoice,
        txn: &mut Txn,
    ) -> Result<(), GovernanceError> {
        if proposal.boosted {
            let stakes = self.store.get_stakes(proposal.id)?;
            let settlement = capture_settlement(proposal, winner, &stakes)
                .ok_or(GovernanceError::Overflow)?;
            if settlement.dust > 0 {
                let fees_before = self.store.retained_fees()?;
                let fees = fees_before
                    .checked_add(settlement.dust)
                    .ok_or(GovernanceError::Overflow)?;
                txn.put_retained_fees(fees, fees_before);
                tracing::debug!(
                    proposal = proposal.id,
                    dust = settlement.dust,
                    "unallocated losing stake retained"
                );
            }
            proposal.settlement = Some(settlement);
        }
        proposal.finalized = true;
        proposal.state = ProposalState::Resolved;
        proposal.winning_side = Some(winner);
        proposal.pended_date = None;

        self.change_state(proposal, ProposalState::Resolved, txn);
        txn.emit(GovernanceEvent::FinalizeProposal { id: proposal.id });
        tracing::info!(
            proposal = proposal.id,
            winner = ?winner,
            yea = proposal.yea,
            nay = proposal.nay,
            boosted = proposal.boosted,
            "proposal finalized"
        );
        Ok(())
    }
}

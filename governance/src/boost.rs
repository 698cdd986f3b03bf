//! Boost controller: confidence, pending and boosting.
//!
//! ```text
//! Queued ─conf ≥ threshold─▶ Pended ─pended period─▶ Boosted
//!                            ▲    │
//!                            │    ▼ conf < threshold
//!                            Unpended
//! ```

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::event::GovernanceEvent;
use crate::txn::Txn;
use holo_types::{
    mul_div_floor, Amount, Proposal, ProposalId, ProposalState, Timestamp, CONFIDENCE_MAX,
    ONE_PERCENT,
};

/// Confidence factor `upstake / downstake` in fixed-point (1% = 1e16).
///
/// Zero without upstake; `CONFIDENCE_MAX` with upstake but no downstake.
pub fn confidence(upstake: Amount, downstake: Amount) -> u128 {
    if upstake == 0 {
        return 0;
    }
    if downstake == 0 {
        return CONFIDENCE_MAX;
    }
    mul_div_floor(upstake, ONE_PERCENT, downstake).unwrap_or(CONFIDENCE_MAX)
}

impl GovernanceEngine {
    pub fn get_confidence(&self, id: ProposalId) -> Result<u128, GovernanceError> {
        let proposal = self.load(id)?;
        Ok(confidence(proposal.upstake, proposal.downstake))
    }

    /// Boost a proposal whose confidence meets the threshold, without waiting
    /// out the pended period.
    pub fn boost_proposal(&mut self, id: ProposalId) -> Result<(), GovernanceError> {
        let mut txn = Txn::new(self.clock.now());
        let before = self.load(id)?;
        if before.boosted {
            return Err(GovernanceError::AlreadyBoosted(id));
        }
        if before.finalized
            || !before.state.is_queued()
            || before.queue_elapsed(self.params.queue_period_secs, txn.now)
        {
            return Err(GovernanceError::ProposalClosed(id));
        }

        let confidence = confidence(before.upstake, before.downstake);
        let threshold = self.params.confidence_threshold();
        if confidence < threshold {
            return Err(GovernanceError::NotEnoughConfidence {
                confidence,
                threshold,
            });
        }

        let mut proposal = before.clone();
        self.apply_boost(&mut proposal, &mut txn);
        txn.put_proposal(&proposal, &before);
        self.commit(txn)
    }

    /// Re-evaluate pending after a stake change on an open, unboosted proposal.
    pub(crate) fn refresh_pending(&self, proposal: &mut Proposal, txn: &mut Txn) {
        let confidence = confidence(proposal.upstake, proposal.downstake);
        let confident = confidence >= self.params.confidence_threshold();

        let state = proposal.state;
        match state {
            ProposalState::Queued | ProposalState::Unpended if confident => {
                proposal.state = ProposalState::Pended;
                proposal.pended_date = Some(txn.now);
                self.change_state(proposal, ProposalState::Pended, txn);
            }
            ProposalState::Pended if !confident => {
                proposal.state = ProposalState::Unpended;
                proposal.pended_date = None;
                self.change_state(proposal, ProposalState::Unpended, txn);
            }
            _ => {}
        }

        let pended_long_enough = proposal
            .pended_date
            .is_some_and(|since| since.has_expired(self.params.pended_boost_period_secs, txn.now));
        if proposal.state == ProposalState::Pended && pended_long_enough {
            self.apply_boost(proposal, txn);
        }
    }

    /// A stake landing in the last `boost_period_extension` seconds of the
    /// boost window pushes the deadline back by that much.
    pub(crate) fn extend_boost(&self, proposal: &mut Proposal, now: Timestamp) {
        let extension = self.params.boost_period_extension_secs;
        let Some(deadline) = proposal.boost_deadline else {
            return;
        };
        let remaining = deadline.as_secs().saturating_sub(now.as_secs());
        if remaining <= extension {
            let extended = deadline.plus(extension);
            proposal.boost_deadline = Some(extended);
            tracing::debug!(proposal = proposal.id, deadline = %extended, "boost window extended");
        }
    }

    fn apply_boost(&self, proposal: &mut Proposal, txn: &mut Txn) {
        let deadline = txn.now.plus(self.params.boost_period_secs);
        proposal.boosted = true;
        proposal.state = ProposalState::Boosted;
        proposal.boost_timestamp = Some(txn.now);
        proposal.boost_deadline = Some(deadline);
        self.change_state(proposal, ProposalState::Boosted, txn);
        tracing::debug!(proposal = proposal.id, deadline = %deadline, "boost window opened");
    }

    pub(crate) fn change_state(&self, proposal: &Proposal, new_state: ProposalState, txn: &mut Txn) {
        tracing::info!(proposal = proposal.id, state = %new_state, "proposal state changed");
        txn.emit(GovernanceEvent::ProposalStateChanged {
            id: proposal.id,
            new_state,
        });
    }
}

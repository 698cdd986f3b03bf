//! Prediction staking: upstake backs the proposal passing, downstake backs it
//! failing. Stake tokens sit in the engine's escrow account while staked.

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::event::GovernanceEvent;
use crate::txn::Txn;
use holo_types::{AccountId, Amount, ProposalId, ProposalState, StakeRecord, StakeSide};

impl GovernanceEngine {
    /// Lock `amount` stake tokens on `side`. The staker must have approved the
    /// escrow account for at least `amount`.
    pub fn stake(
        &mut self,
        id: ProposalId,
        staker: &AccountId,
        amount: Amount,
        side: StakeSide,
    ) -> Result<(), GovernanceError> {
        let mut txn = Txn::new(self.clock.now());
        let before = self.load(id)?;
        if amount == 0 {
            return Err(GovernanceError::ZeroAmount);
        }
        self.ensure_open(&before, txn.now)?;

        let available = self.ledgers.stake.balance_of(staker);
        if available < amount {
            return Err(GovernanceError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        let allowance = self.ledgers.stake.allowance(staker, &self.escrow);
        if allowance < amount {
            return Err(GovernanceError::InsufficientAllowance {
                needed: amount,
                available: allowance,
            });
        }

        let record_before = self.stake_record(id, staker)?;
        let mut record = record_before;
        let staked = record.on_mut(side);
        *staked = staked.checked_add(amount).ok_or(GovernanceError::Overflow)?;

        let mut proposal = before.clone();
        let pool = proposal.stake_on_mut(side);
        *pool = pool.checked_add(amount).ok_or(GovernanceError::Overflow)?;

        txn.put_stake(id, staker, record, record_before);
        txn.emit(match side {
            StakeSide::Up => GovernanceEvent::UpstakeProposal {
                id,
                staker: staker.clone(),
                amount,
            },
            StakeSide::Down => GovernanceEvent::DownstakeProposal {
                id,
                staker: staker.clone(),
                amount,
            },
        });
        tracing::debug!(proposal = id, staker = %staker, amount, ?side, "stake placed");

        if proposal.boosted {
            self.extend_boost(&mut proposal, txn.now);
        } else {
            self.refresh_pending(&mut proposal, &mut txn);
        }
        txn.put_proposal(&proposal, &before);

        self.ledgers
            .stake
            .transfer_from(&self.escrow, staker, &self.escrow, amount)?;
        self.commit_after_deposit(txn, staker, amount)
    }

    /// Withdraw `amount` from an unboosted or expired proposal, or from one
    /// finalized without boosting. Boosted stake is either locked (until
    /// finalization) or settled (use `withdraw_reward`).
    pub fn unstake(
        &mut self,
        id: ProposalId,
        staker: &AccountId,
        amount: Amount,
        side: StakeSide,
    ) -> Result<(), GovernanceError> {
        let mut txn = Txn::new(self.clock.now());
        let before = self.load(id)?;
        if amount == 0 {
            return Err(GovernanceError::ZeroAmount);
        }
        if before.boosted {
            return Err(if before.finalized {
                GovernanceError::StakeSettled(id)
            } else {
                GovernanceError::StakeLocked(id)
            });
        }

        let record_before = self.stake_record(id, staker)?;
        let available = record_before.on(side);
        if available < amount {
            return Err(GovernanceError::InsufficientStake {
                requested: amount,
                available,
            });
        }

        let mut record = record_before;
        *record.on_mut(side) = available - amount;

        let mut proposal = before.clone();
        let pool = proposal.stake_on_mut(side);
        *pool = pool.checked_sub(amount).ok_or(GovernanceError::Overflow)?;

        txn.put_stake(id, staker, record, record_before);
        txn.emit(match side {
            StakeSide::Up => GovernanceEvent::WithdrawUpstake {
                id,
                staker: staker.clone(),
                amount,
            },
            StakeSide::Down => GovernanceEvent::WithdrawDownstake {
                id,
                staker: staker.clone(),
                amount,
            },
        });
        tracing::debug!(proposal = id, staker = %staker, amount, ?side, "stake withdrawn");

        if !proposal.finalized && proposal.state.is_queued() {
            if proposal.queue_elapsed(self.params.queue_period_secs, txn.now) {
                proposal.state = ProposalState::Expired;
                proposal.pended_date = None;
                self.change_state(&proposal, ProposalState::Expired, &mut txn);
            } else {
                self.refresh_pending(&mut proposal, &mut txn);
            }
        }
        txn.put_proposal(&proposal, &before);

        self.commit_then_pay(txn, staker, amount)
    }

    pub fn get_upstake(&self, id: ProposalId, staker: &AccountId) -> Result<Amount, GovernanceError> {
        self.load(id)?;
        Ok(self.stake_record(id, staker)?.upstake)
    }

    pub fn get_downstake(
        &self,
        id: ProposalId,
        staker: &AccountId,
    ) -> Result<Amount, GovernanceError> {
        self.load(id)?;
        Ok(self.stake_record(id, staker)?.downstake)
    }

    /// Every stake record on a proposal, sorted by staker. Settled and
    /// withdrawn records read as zero.
    pub fn get_stakes(
        &self,
        id: ProposalId,
    ) -> Result<Vec<(AccountId, StakeRecord)>, GovernanceError> {
        self.load(id)?;
        let mut stakes = self.store.get_stakes(id)?;
        stakes.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(stakes)
    }
}

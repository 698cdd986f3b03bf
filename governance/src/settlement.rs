//! Settlement of boosted proposals.
//!
//! Winners get their stake back plus a pro-rata share of the losing pool,
//! less the compensation fee. The losing pool is forfeited. All arithmetic
//! floors; the losing stake no share covers is credited to the retained fees
//! at finalization, so escrow always equals what winners and the fee
//! collector can still claim.

use crate::engine::GovernanceEngine;
use crate::error::GovernanceError;
use crate::event::GovernanceEvent;
use crate::txn::Txn;
use holo_store::StoreError;
use holo_types::{
    mul_div_floor, AccountId, Amount, Proposal, ProposalId, Settlement, StakeRecord, StakeSide,
    VoteChoice,
};

/// Breakdown of one winner's settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardPayout {
    /// The winner's own stake, returned in full.
    pub principal: Amount,
    /// Pro-rata share of the losing pool, before the fee.
    pub share: Amount,
    /// Compensation fee retained by the engine.
    pub fee: Amount,
    /// `principal + share - fee`.
    pub total: Amount,
}

/// Settle `stake` out of `winning_pool` against `losing_pool`.
pub fn compute_payout(
    stake: Amount,
    winning_pool: Amount,
    losing_pool: Amount,
    fee_pct: u8,
) -> Option<RewardPayout> {
    let share = mul_div_floor(stake, losing_pool, winning_pool)?;
    let fee = mul_div_floor(share, fee_pct as u128, 100)?;
    let total = stake.checked_add(share)?.checked_sub(fee)?;
    Some(RewardPayout {
        principal: stake,
        share,
        fee,
        total,
    })
}

/// Snapshot the pools of a boosted proposal resolving to `winner`, and the
/// part of the losing pool left once every winner's share is floored.
pub(crate) fn capture_settlement(
    proposal: &Proposal,
    winner: VoteChoice,
    stakes: &[(AccountId, StakeRecord)],
) -> Option<Settlement> {
    let side = StakeSide::backing(winner).unwrap_or(StakeSide::Down);
    let winning_pool = proposal.stake_on(side);
    let losing_pool = proposal.stake_on(side.opposite());

    let mut shares: Amount = 0;
    if winning_pool > 0 {
        for (_, record) in stakes {
            let share = mul_div_floor(record.on(side), losing_pool, winning_pool)?;
            shares = shares.checked_add(share)?;
        }
    }

    Some(Settlement {
        winning_pool,
        losing_pool,
        paid_out: 0,
        fees_retained: 0,
        dust: losing_pool.checked_sub(shares)?,
    })
}

impl GovernanceEngine {
    /// Pay a winning staker of a finalized boosted proposal.
    pub fn withdraw_reward(
        &mut self,
        id: ProposalId,
        staker: &AccountId,
    ) -> Result<RewardPayout, GovernanceError> {
        let mut txn = Txn::new(self.clock.now());
        let before = self.load(id)?;
        if !before.finalized {
            return Err(GovernanceError::NotFinalized(id));
        }
        if !before.boosted {
            return Err(GovernanceError::NotBoosted(id));
        }
        let (side, mut settlement) = match (
            before.winning_side.and_then(StakeSide::backing),
            before.settlement,
        ) {
            (Some(side), Some(settlement)) => (side, settlement),
            _ => {
                return Err(StoreError::Corruption(format!(
                    "finalized boosted proposal {id} has no settlement"
                ))
                .into())
            }
        };

        let record_before = self.stake_record(id, staker)?;
        let stake = record_before.on(side);
        if stake == 0 {
            return Err(GovernanceError::NoWinningStake(staker.to_string()));
        }

        let payout = compute_payout(
            stake,
            settlement.winning_pool,
            settlement.losing_pool,
            self.params.compensation_fee_pct,
        )
        .ok_or(GovernanceError::Overflow)?;

        let mut record = record_before;
        *record.on_mut(side) = 0;

        let mut proposal = before.clone();
        let pool = proposal.stake_on_mut(side);
        *pool = pool.checked_sub(stake).ok_or(GovernanceError::Overflow)?;
        settlement.paid_out = settlement
            .paid_out
            .checked_add(payout.total)
            .ok_or(GovernanceError::Overflow)?;
        settlement.fees_retained = settlement
            .fees_retained
            .checked_add(payout.fee)
            .ok_or(GovernanceError::Overflow)?;
        proposal.settlement = Some(settlement);

        let fees_before = self.store.retained_fees()?;
        let fees = fees_before
            .checked_add(payout.fee)
            .ok_or(GovernanceError::Overflow)?;

        txn.put_stake(id, staker, record, record_before);
        txn.put_proposal(&proposal, &before);
        txn.put_retained_fees(fees, fees_before);
        txn.emit(match side {
            StakeSide::Up => GovernanceEvent::WithdrawUpstake {
                id,
                staker: staker.clone(),
                amount: payout.total,
            },
            StakeSide::Down => GovernanceEvent::WithdrawDownstake {
                id,
                staker: staker.clone(),
                amount: payout.total,
            },
        });
        txn.emit(GovernanceEvent::RewardWithdrawn {
            id,
            staker: staker.clone(),
            payout: payout.total,
            fee: payout.fee,
        });

        self.commit_then_pay(txn, staker, payout.total)?;
        tracing::info!(
            proposal = id,
            staker = %staker,
            payout = payout.total,
            fee = payout.fee,
            "reward withdrawn"
        );
        Ok(payout)
    }

    /// Total compensation fees held in escrow and not yet collected.
    pub fn retained_fees(&self) -> Result<Amount, GovernanceError> {
        Ok(self.store.retained_fees()?)
    }

    /// Transfer every retained fee out of escrow to `to`.
    pub fn collect_fees(&mut self, to: &AccountId) -> Result<Amount, GovernanceError> {
        let mut txn = Txn::new(self.clock.now());
        let amount = self.store.retained_fees()?;
        if amount == 0 {
            return Err(GovernanceError::NoFeesToCollect);
        }
        txn.put_retained_fees(0, amount);
        txn.emit(GovernanceEvent::FeesCollected {
            to: to.clone(),
            amount,
        });
        self.commit_then_pay(txn, to, amount)?;
        tracing::info!(to = %to, amount, "fees collected");
        Ok(amount)
    }
}

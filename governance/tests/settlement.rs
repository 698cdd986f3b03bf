mod common;

use common::{acct, Harness};
use holo_governance::{GovernanceError, GovernanceEvent};
use holo_types::{GovernanceParams, ProposalId, StakeSide};

/// Voters a, b, c with one vote each out of six; a and b vote yea, c nay.
/// a and b upstake 200 each, c downstakes 100, then the proposal is boosted
/// and finalized with yea winning.
fn settled_reference(h: &mut Harness) -> ProposalId {
    h.voters(&[("a", 1), ("b", 1), ("c", 1), ("d", 1), ("e", 1), ("f", 1)]);
    for name in ["a", "b", "c"] {
        h.staker(name, 1_000);
    }
    let id = h.propose();
    h.engine.vote(id, &acct("a"), true).unwrap();
    h.engine.vote(id, &acct("b"), true).unwrap();
    h.engine.vote(id, &acct("c"), false).unwrap();
    h.engine.stake(id, &acct("a"), 200, StakeSide::Up).unwrap();
    h.engine.stake(id, &acct("b"), 200, StakeSide::Up).unwrap();
    h.engine.stake(id, &acct("c"), 100, StakeSide::Down).unwrap();
    h.engine.boost_proposal(id).unwrap();
    h.clock.advance(h.engine.params().boost_period_secs);
    h.engine.finalize_proposal(id).unwrap();
    id
}

#[test]
fn reference_settlement_balances() {
    let mut h = Harness::new();
    let id = settled_reference(&mut h);

    let payout = h.engine.withdraw_reward(id, &acct("a")).unwrap();
    assert_eq!((payout.share, payout.fee, payout.total), (50, 0, 250));
    h.engine.withdraw_reward(id, &acct("b")).unwrap();

    assert_eq!(h.stake_balance("a"), 1_050);
    assert_eq!(h.stake_balance("b"), 1_050);
    assert_eq!(h.stake_balance("c"), 900);
    assert_eq!(h.escrow_balance(), 0);

    assert!(matches!(
        h.engine.withdraw_reward(id, &acct("c")),
        Err(GovernanceError::NoWinningStake(_))
    ));
}

#[test]
fn reward_can_only_be_withdrawn_once() {
    let mut h = Harness::new();
    let id = settled_reference(&mut h);
    h.engine.withdraw_reward(id, &acct("a")).unwrap();
    assert!(matches!(
        h.engine.withdraw_reward(id, &acct("a")),
        Err(GovernanceError::NoWinningStake(_))
    ));
    assert!(matches!(
        h.engine.unstake(id, &acct("a"), 1, StakeSide::Up),
        Err(GovernanceError::StakeSettled(_))
    ));
}

#[test]
fn losing_stake_is_forfeited() {
    let mut h = Harness::new();
    let id = settled_reference(&mut h);
    assert!(matches!(
        h.engine.unstake(id, &acct("c"), 100, StakeSide::Down),
        Err(GovernanceError::StakeSettled(_))
    ));
    assert_eq!(h.engine.get_downstake(id, &acct("c")).unwrap(), 100);
}

#[test]
fn withdraw_events_and_settlement_bookkeeping() {
    let mut h = Harness::new();
    let id = settled_reference(&mut h);
    h.engine.drain_events();

    h.engine.withdraw_reward(id, &acct("b")).unwrap();
    assert_eq!(
        h.engine.drain_events(),
        vec![
            GovernanceEvent::WithdrawUpstake {
                id,
                staker: acct("b"),
                amount: 250,
            },
            GovernanceEvent::RewardWithdrawn {
                id,
                staker: acct("b"),
                payout: 250,
                fee: 0,
            },
        ]
    );

    let p = h.engine.get_proposal(id).unwrap();
    let settlement = p.settlement.unwrap();
    assert_eq!(settlement.winning_pool, 400);
    assert_eq!(settlement.losing_pool, 100);
    assert_eq!(settlement.paid_out, 250);
    assert_eq!(p.upstake, 200);
    assert_eq!(h.engine.get_upstake(id, &acct("b")).unwrap(), 0);
}

#[test]
fn withdraw_preconditions() {
    let mut h = Harness::new();
    h.voters(&[("a", 60), ("b", 40)]);
    h.staker("s", 100);
    let id = h.propose();
    h.engine.stake(id, &acct("s"), 10, StakeSide::Up).unwrap();

    assert!(matches!(
        h.engine.withdraw_reward(id, &acct("s")),
        Err(GovernanceError::NotFinalized(_))
    ));

    h.engine.vote(id, &acct("a"), true).unwrap();
    assert!(matches!(
        h.engine.withdraw_reward(id, &acct("s")),
        Err(GovernanceError::NotBoosted(_))
    ));

    // Resolved without boosting: stake comes back through unstake.
    h.engine.unstake(id, &acct("s"), 10, StakeSide::Up).unwrap();
    assert_eq!(h.stake_balance("s"), 100);
}

#[test]
fn compensation_fee_is_retained_and_collectable() {
    let mut h = Harness::with_params(GovernanceParams {
        compensation_fee_pct: 10,
        confidence_threshold_base: 1,
        ..GovernanceParams::default()
    });
    h.voters(&[("a", 1), ("b", 1), ("c", 1)]);
    h.staker("up", 1_000);
    h.staker("down", 1_000);
    let id = h.propose();
    h.engine.stake(id, &acct("up"), 100, StakeSide::Up).unwrap();
    h.engine.stake(id, &acct("down"), 100, StakeSide::Down).unwrap();
    h.engine.boost_proposal(id).unwrap();
    h.engine.vote(id, &acct("a"), true).unwrap();
    h.clock.advance(10);
    h.engine.finalize_proposal(id).unwrap();

    let payout = h.engine.withdraw_reward(id, &acct("up")).unwrap();
    assert_eq!((payout.share, payout.fee, payout.total), (100, 10, 190));
    assert_eq!(h.stake_balance("up"), 1_090);
    assert_eq!(h.engine.retained_fees().unwrap(), 10);
    assert_eq!(h.escrow_balance(), 10);
    assert_eq!(
        h.engine.get_proposal(id).unwrap().settlement.unwrap().fees_retained,
        10
    );

    h.engine.drain_events();
    assert_eq!(h.engine.collect_fees(&acct("treasury")).unwrap(), 10);
    assert_eq!(
        h.engine.drain_events(),
        vec![GovernanceEvent::FeesCollected {
            to: acct("treasury"),
            amount: 10,
        }]
    );
    assert_eq!(h.stake_balance("treasury"), 10);
    assert_eq!(h.escrow_balance(), 0);
    assert!(matches!(
        h.engine.collect_fees(&acct("treasury")),
        Err(GovernanceError::NoFeesToCollect)
    ));
}

#[test]
fn failed_payout_write_leaves_reward_claimable() {
    let mut h = Harness::new();
    let id = settled_reference(&mut h);

    h.store.set_fail_writes(true);
    assert!(matches!(
        h.engine.withdraw_reward(id, &acct("a")),
        Err(GovernanceError::Store(_))
    ));
    h.store.set_fail_writes(false);

    assert_eq!(h.stake_balance("a"), 800);
    assert_eq!(h.engine.withdraw_reward(id, &acct("a")).unwrap().total, 250);
}

#[test]
fn losing_pool_without_winners_is_collectable() {
    let mut h = Harness::new();
    h.staker("s", 100);
    let id = h.propose();
    h.engine.stake(id, &acct("s"), 10, StakeSide::Up).unwrap();
    h.engine.boost_proposal(id).unwrap();
    h.clock.advance(10);
    // No votes: the tie resolves nay and nobody downstaked.
    h.engine.finalize_proposal(id).unwrap();

    assert_eq!(h.engine.get_proposal(id).unwrap().settlement.unwrap().dust, 10);
    assert_eq!(h.engine.retained_fees().unwrap(), 10);
    assert_eq!(h.escrow_balance(), 10);
    assert!(matches!(
        h.engine.unstake(id, &acct("s"), 10, StakeSide::Up),
        Err(GovernanceError::StakeSettled(_))
    ));
    assert!(matches!(
        h.engine.withdraw_reward(id, &acct("s")),
        Err(GovernanceError::NoWinningStake(_))
    ));

    assert_eq!(h.engine.collect_fees(&acct("treasury")).unwrap(), 10);
    assert_eq!(h.stake_balance("treasury"), 10);
    assert_eq!(h.escrow_balance(), 0);
}

#[test]
fn rounding_dust_is_retained_at_finalization() {
    let mut h = Harness::with_params(GovernanceParams {
        compensation_fee_pct: 0,
        ..GovernanceParams::default()
    });
    h.voters(&[("a", 1), ("b", 1), ("c", 1)]);
    for name in ["x", "y", "z", "d"] {
        h.staker(name, 1_000);
    }
    let id = h.propose();
    for name in ["x", "y", "z"] {
        h.engine.stake(id, &acct(name), 100, StakeSide::Up).unwrap();
    }
    h.engine.stake(id, &acct("d"), 10, StakeSide::Down).unwrap();
    h.engine.boost_proposal(id).unwrap();
    h.engine.vote(id, &acct("a"), true).unwrap();
    h.clock.advance(h.engine.params().boost_period_secs);
    h.engine.finalize_proposal(id).unwrap();

    // Each share is floor(100 * 10 / 300) = 3, leaving 1 of the 10.
    assert_eq!(h.engine.retained_fees().unwrap(), 1);
    for name in ["x", "y", "z"] {
        assert_eq!(h.engine.withdraw_reward(id, &acct(name)).unwrap().total, 103);
    }
    assert_eq!(h.escrow_balance(), h.engine.retained_fees().unwrap());
    assert_eq!(h.engine.collect_fees(&acct("treasury")).unwrap(), 1);
    assert_eq!(h.escrow_balance(), 0);
}

#[test]
fn failed_finalize_write_leaves_fees_untouched() {
    let mut h = Harness::new();
    h.staker("s", 100);
    let id = h.propose();
    h.engine.stake(id, &acct("s"), 10, StakeSide::Up).unwrap();
    h.engine.boost_proposal(id).unwrap();
    h.clock.advance(10);

    h.store.set_fail_writes(true);
    assert!(matches!(
        h.engine.finalize_proposal(id),
        Err(GovernanceError::Store(_))
    ));
    h.store.set_fail_writes(false);
    assert_eq!(h.engine.retained_fees().unwrap(), 0);

    h.engine.finalize_proposal(id).unwrap();
    assert_eq!(h.engine.retained_fees().unwrap(), 10);
}

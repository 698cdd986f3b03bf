use holo_ledger::LedgerError;
use holo_store::StoreError;
use holo_types::{ParamsError, ProposalId};
use thiserror::Error;

/// Every error aborts the whole operation; no partial state is committed.
#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {0} does not exist")]
    ProposalNotFound(ProposalId),

    #[error("proposal {0} is closed")]
    ProposalClosed(ProposalId),

    #[error("proposal {0} is still within its queue period")]
    ProposalNotExpired(ProposalId),

    #[error("account {0} has no voting power")]
    NoVotingPower(String),

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, have {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("insufficient stake: requested {requested}, staked {available}")]
    InsufficientStake { requested: u128, available: u128 },

    #[error("stake on boosted proposal {0} is locked until finalization")]
    StakeLocked(ProposalId),

    #[error("stake on proposal {0} was settled; use withdraw_reward")]
    StakeSettled(ProposalId),

    #[error("not enough confidence to boost: {confidence} < {threshold}")]
    NotEnoughConfidence { confidence: u128, threshold: u128 },

    #[error("proposal {0} is already boosted")]
    AlreadyBoosted(ProposalId),

    #[error("proposal {0} does not have absolute majority support")]
    NotEnoughAbsoluteSupport(ProposalId),

    #[error("boost period of proposal {0} has not elapsed")]
    BoostPeriodActive(ProposalId),

    #[error("proposal {0} is already finalized")]
    AlreadyFinalized(ProposalId),

    #[error("proposal {0} is not finalized")]
    NotFinalized(ProposalId),

    #[error("proposal {0} was not boosted; withdraw stake with unstake")]
    NotBoosted(ProposalId),

    #[error("account {0} has no stake on the winning side")]
    NoWinningStake(String),

    #[error("no retained fees to collect")]
    NoFeesToCollect,

    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

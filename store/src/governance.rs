//! Governance storage trait.

use crate::{StoreError, WriteBatch};
use holo_types::{AccountId, Amount, Proposal, ProposalId, StakeRecord, VoteRecord};

/// Repository for proposals, vote records, stake records and the engine-wide
/// retained-fee counter.
///
/// Reads see only committed state. Writes go exclusively through
/// [`GovernanceStore::apply`], which must apply the whole batch or nothing.
pub trait GovernanceStore: Send + Sync {
    /// Number of proposals ever created. Also the id the next proposal receives.
    fn proposal_count(&self) -> Result<u64, StoreError>;

    /// Get a proposal by id.
    fn get_proposal(&self, id: ProposalId) -> Result<Option<Proposal>, StoreError>;

    /// Get a specific voter's vote on a proposal.
    fn get_vote(&self, id: ProposalId, voter: &AccountId)
        -> Result<Option<VoteRecord>, StoreError>;

    /// Get a specific staker's stake on a proposal.
    fn get_stake(&self, id: ProposalId, staker: &AccountId)
        -> Result<Option<StakeRecord>, StoreError>;

    /// All stake records for a proposal, in no particular order.
    fn get_stakes(&self, id: ProposalId) -> Result<Vec<(AccountId, StakeRecord)>, StoreError>;

    /// Compensation fees retained by the engine and not yet collected.
    fn retained_fees(&self) -> Result<Amount, StoreError>;

    /// Atomically apply every write in the batch.
    fn apply(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

//! Nullable store: thread-safe in-memory governance storage.

use holo_store::{GovernanceStore, StoreError, WriteBatch, WriteOp};
use holo_types::{AccountId, Amount, Proposal, ProposalId, StakeRecord, VoteRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[derive(Clone, Default)]
struct Tables {
    proposals: BTreeMap<ProposalId, Proposal>,
    votes: HashMap<(ProposalId, AccountId), VoteRecord>,
    stakes: HashMap<(ProposalId, AccountId), StakeRecord>,
    retained_fees: Amount,
}

/// An in-memory [`GovernanceStore`].
///
/// Batches are applied to a copy of the tables and swapped in only when every
/// write succeeded, so a rejected batch leaves nothing behind.
pub struct NullStore {
    tables: Mutex<Tables>,
    /// When set, every `apply` fails with a backend error. Used to exercise
    /// the engine's rollback path.
    fail_writes: Mutex<bool>,
}

/// Serializable image of the whole store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub proposals: Vec<Proposal>,
    pub votes: Vec<(ProposalId, AccountId, VoteRecord)>,
    pub stakes: Vec<(ProposalId, AccountId, StakeRecord)>,
    pub retained_fees: Amount,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            fail_writes: Mutex::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every subsequent `apply` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) = fail;
    }

    /// Capture the full store contents.
    pub fn snapshot(&self) -> StoreSnapshot {
        let tables = self.lock();
        let mut votes: Vec<_> = tables
            .votes
            .iter()
            .map(|((id, voter), record)| (*id, voter.clone(), *record))
            .collect();
        votes.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
        let mut stakes: Vec<_> = tables
            .stakes
            .iter()
            .map(|((id, staker), record)| (*id, staker.clone(), *record))
            .collect();
        stakes.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
        StoreSnapshot {
            proposals: tables.proposals.values().cloned().collect(),
            votes,
            stakes,
            retained_fees: tables.retained_fees,
        }
    }

    /// Rebuild a store from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, StoreError> {
        let mut tables = Tables::default();
        for (expected, proposal) in snapshot.proposals.into_iter().enumerate() {
            if proposal.id != expected as ProposalId {
                return Err(StoreError::Corruption(format!(
                    "proposal ids are not sequential: found {} at position {expected}",
                    proposal.id
                )));
            }
            tables.proposals.insert(proposal.id, proposal);
        }
        for (id, voter, record) in snapshot.votes {
            tables.votes.insert((id, voter), record);
        }
        for (id, staker, record) in snapshot.stakes {
            tables.stakes.insert((id, staker), record);
        }
        tables.retained_fees = snapshot.retained_fees;
        Ok(Self {
            tables: Mutex::new(tables),
            fail_writes: Mutex::new(false),
        })
    }

    /// Serialize the store to bytes.
    pub fn save_state(&self) -> Result<Vec<u8>, StoreError> {
        bincode::serialize(&self.snapshot()).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Restore a store from bytes produced by [`NullStore::save_state`].
    pub fn load_state(data: &[u8]) -> Result<Self, StoreError> {
        let snapshot: StoreSnapshot =
            bincode::deserialize(data).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }

    /// Write the store to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), StoreError> {
        let bytes = self.save_state()?;
        std::fs::write(path, bytes).map_err(|e| StoreError::Backend(e.to_string()))
    }

    /// Load a store from a file written by [`NullStore::save_to_file`].
    pub fn load_from_file(path: &Path) -> Result<Self, StoreError> {
        let bytes = std::fs::read(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        Self::load_state(&bytes)
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GovernanceStore for NullStore {
    fn proposal_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock().proposals.len() as u64)
    }

    fn get_proposal(&self, id: ProposalId) -> Result<Option<Proposal>, StoreError> {
        Ok(self.lock().proposals.get(&id).cloned())
    }

    fn get_vote(
        &self,
        id: ProposalId,
        voter: &AccountId,
    ) -> Result<Option<VoteRecord>, StoreError> {
        Ok(self.lock().votes.get(&(id, voter.clone())).copied())
    }

    fn get_stake(
        &self,
        id: ProposalId,
        staker: &AccountId,
    ) -> Result<Option<StakeRecord>, StoreError> {
        Ok(self.lock().stakes.get(&(id, staker.clone())).copied())
    }

    fn get_stakes(&self, id: ProposalId) -> Result<Vec<(AccountId, StakeRecord)>, StoreError> {
        Ok(self
            .lock()
            .stakes
            .iter()
            .filter(|((pid, _), _)| *pid == id)
            .map(|((_, staker), record)| (staker.clone(), *record))
            .collect())
    }

    fn retained_fees(&self) -> Result<Amount, StoreError> {
        Ok(self.lock().retained_fees)
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if *self.fail_writes.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(StoreError::Backend("writes disabled".into()));
        }
        let mut tables = self.lock();
        let mut staged = tables.clone();
        for op in batch.into_ops() {
            match op {
                WriteOp::PutProposal(proposal) => {
                    let next = staged.proposals.len() as ProposalId;
                    if proposal.id > next {
                        return Err(StoreError::Corruption(format!(
                            "proposal {} written before proposal {next}",
                            proposal.id
                        )));
                    }
                    staged.proposals.insert(proposal.id, proposal);
                }
                WriteOp::PutVote {
                    proposal,
                    voter,
                    record,
                } => {
                    staged.votes.insert((proposal, voter), record);
                }
                WriteOp::PutStake {
                    proposal,
                    staker,
                    record,
                } => {
                    staged.stakes.insert((proposal, staker), record);
                }
                WriteOp::PutRetainedFees(amount) => staged.retained_fees = amount,
            }
        }
        *tables = staged;
        Ok(())
    }
}

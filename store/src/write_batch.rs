//! Write batching: stages every record write of one engine operation so the
//! store can apply them atomically.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = WriteBatch::new();
//! batch.put_proposal(proposal);
//! batch.put_stake(id, staker, record);
//! store.apply(batch)?;
//! ```
//!
//! A batch that is dropped without being applied leaves the store untouched.

use holo_types::{AccountId, Amount, Proposal, ProposalId, StakeRecord, VoteRecord};

/// A single staged write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    PutProposal(Proposal),
    PutVote {
        proposal: ProposalId,
        voter: AccountId,
        record: VoteRecord,
    },
    PutStake {
        proposal: ProposalId,
        staker: AccountId,
        record: StakeRecord,
    },
    PutRetainedFees(Amount),
}

/// Ordered list of staged writes. Later writes to the same key win.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_proposal(&mut self, proposal: Proposal) {
        self.ops.push(WriteOp::PutProposal(proposal));
    }

    pub fn put_vote(&mut self, proposal: ProposalId, voter: AccountId, record: VoteRecord) {
        self.ops.push(WriteOp::PutVote {
            proposal,
            voter,
            record,
        });
    }

    pub fn put_stake(&mut self, proposal: ProposalId, staker: AccountId, record: StakeRecord) {
        self.ops.push(WriteOp::PutStake {
            proposal,
            staker,
            record,
        });
    }

    pub fn put_retained_fees(&mut self, amount: Amount) {
        self.ops.push(WriteOp::PutRetainedFees(amount));
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holo_types::{Timestamp, VoteChoice};

    #[test]
    fn batch_preserves_order() {
        let mut batch = WriteBatch::new();
        assert!(batch.is_empty());

        let proposal = Proposal::new(0, AccountId::new("a"), "m".into(), Timestamp::new(1));
        batch.put_proposal(proposal.clone());
        batch.put_vote(
            0,
            AccountId::new("v"),
            VoteRecord {
                choice: VoteChoice::Yea,
                weight: 3,
            },
        );
        batch.put_retained_fees(9);

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.ops()[0], WriteOp::PutProposal(proposal));
        assert!(matches!(batch.ops()[1], WriteOp::PutVote { proposal: 0, .. }));
        assert_eq!(batch.into_ops()[2], WriteOp::PutRetainedFees(9));
    }
}

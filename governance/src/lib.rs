//! Holographic consensus governance.
//!
//! Proposals are decided by token-weighted vote. An absolute majority of the
//! vote-token supply resolves a proposal at once; otherwise stakers predict the
//! outcome with a second token, and enough predicted confidence boosts the
//! proposal onto a short relative-majority track. Stakers on the winning side
//! of a boosted proposal split the losing side's stake.
//!
//! Lifecycle: Queued → (Pended ⇄ Unpended) → Boosted → Resolved, with
//! Queued → Resolved on absolute majority and Queued → Expired when the queue
//! period lapses.

pub mod boost;
pub mod engine;
pub mod error;
pub mod event;
pub mod resolution;
pub mod settlement;
pub mod staking;
mod txn;
pub mod voting;

pub use boost::confidence;
pub use engine::{GovernanceEngine, Ledgers};
pub use error::GovernanceError;
pub use event::{EventBus, GovernanceEvent};
pub use settlement::{compute_payout, RewardPayout};

//! Fundamental types for the holographic consensus engine.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account ids, timestamps and clocks, fixed-point amounts, governance parameters,
//! and the persisted proposal / vote / stake records.

pub mod account;
pub mod amount;
pub mod error;
pub mod params;
pub mod proposal;
pub mod record;
pub mod time;

pub use account::AccountId;
pub use amount::{mul_div_floor, Amount, CONFIDENCE_MAX, ONE_PERCENT, PCT_BASE};
pub use error::ParamsError;
pub use params::GovernanceParams;
pub use proposal::{Proposal, ProposalId, ProposalState, Settlement};
pub use record::{StakeRecord, StakeSide, VoteChoice, VoteRecord};
pub use time::{Clock, SystemClock, Timestamp};

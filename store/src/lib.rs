//! Abstract storage traits for the holographic consensus engine.
//!
//! Every storage backend (in-memory for testing, durable snapshots) implements
//! these traits. The engine depends only on the traits.

pub mod error;
pub mod governance;
pub mod write_batch;

pub use error::StoreError;
pub use governance::GovernanceStore;
pub use write_batch::{WriteBatch, WriteOp};

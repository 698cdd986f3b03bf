//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies of the engine (clock, storage) are abstracted behind
//! traits. This crate provides implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests. `NullStore` doubles
//! as the in-memory store of the daemon, with bincode snapshots for persistence.

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::{NullStore, StoreSnapshot};

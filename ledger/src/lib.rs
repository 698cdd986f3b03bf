//! Fungible token ledger adapter.
//!
//! The governance engine consumes two token ledgers (vote token and stake token)
//! through the [`TokenLedger`] trait and never implements token semantics itself.
//! [`MemoryToken`] is an in-memory token with standard allowance semantics,
//! used by the daemon and by tests.

pub mod error;
pub mod memory;
pub mod token;

pub use error::LedgerError;
pub use memory::{MemoryToken, TokenSnapshot};
pub use token::TokenLedger;

//! The ledger adapter contract.

use crate::LedgerError;
use holo_types::{AccountId, Amount};

/// Fungible token operations the engine calls but does not implement.
///
/// Every mutating call either completes or fails without any balance change.
/// Methods take `&self` so one ledger can be shared between the engine and
/// whatever else mints, approves or transfers on it.
pub trait TokenLedger: Send + Sync {
    fn balance_of(&self, account: &AccountId) -> Amount;

    fn total_supply(&self) -> Amount;

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount;

    /// Move `amount` from `from` to `to` on `from`'s own authority.
    fn transfer(&self, from: &AccountId, to: &AccountId, amount: Amount)
        -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to` on `spender`'s allowance, consuming it.
    fn transfer_from(
        &self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;
}

//! In-memory fungible token.

use crate::{LedgerError, TokenLedger};
use holo_types::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct TokenState {
    balances: HashMap<AccountId, Amount>,
    allowances: HashMap<(AccountId, AccountId), Amount>,
    total_supply: Amount,
}

/// A thread-safe in-memory token with mint, burn, approve and transfer.
pub struct MemoryToken {
    symbol: String,
    state: Mutex<TokenState>,
}

/// Serializable view of every balance, for inspection and reporting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub symbol: String,
    pub total_supply: Amount,
    pub balances: Vec<(AccountId, Amount)>,
}

impl MemoryToken {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            state: Mutex::new(TokenState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TokenState> {
        // Mutations validate before writing, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create `amount` new tokens for `to`.
    pub fn mint(&self, to: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        let mut state = self.lock();
        let supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let balance = state.balances.get(to).copied().unwrap_or(0);
        let new_balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        state.total_supply = supply;
        state.balances.insert(to.clone(), new_balance);
        tracing::debug!(token = %self.symbol, account = %to, amount, "minted");
        Ok(())
    }

    /// Destroy `amount` of `from`'s tokens.
    pub fn burn(&self, from: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        let mut state = self.lock();
        let balance = state.balances.get(from).copied().unwrap_or(0);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from.to_string(),
                needed: amount,
                available: balance,
            });
        }
        state.balances.insert(from.clone(), balance - amount);
        state.total_supply -= amount;
        Ok(())
    }

    /// Set the allowance `owner` grants `spender`, replacing any previous value.
    pub fn approve(&self, owner: &AccountId, spender: &AccountId, amount: Amount) {
        self.lock()
            .allowances
            .insert((owner.clone(), spender.clone()), amount);
    }

    pub fn snapshot(&self) -> TokenSnapshot {
        let state = self.lock();
        let mut balances: Vec<(AccountId, Amount)> = state
            .balances
            .iter()
            .filter(|(_, b)| **b > 0)
            .map(|(a, b)| (a.clone(), *b))
            .collect();
        balances.sort();
        TokenSnapshot {
            symbol: self.symbol.clone(),
            total_supply: state.total_supply,
            balances,
        }
    }
}

fn move_balance(
    state: &mut TokenState,
    from: &AccountId,
    to: &AccountId,
    amount: Amount,
) -> Result<(), LedgerError> {
    let from_balance = state.balances.get(from).copied().unwrap_or(0);
    if from_balance < amount {
        return Err(LedgerError::InsufficientBalance {
            account: from.to_string(),
            needed: amount,
            available: from_balance,
        });
    }
    if from == to {
        return Ok(());
    }
    let to_balance = state.balances.get(to).copied().unwrap_or(0);
    let new_to = to_balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
    state.balances.insert(from.clone(), from_balance - amount);
    state.balances.insert(to.clone(), new_to);
    Ok(())
}

impl TokenLedger for MemoryToken {
    fn balance_of(&self, account: &AccountId) -> Amount {
        self.lock().balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> Amount {
        self.lock().total_supply
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.lock()
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock();
        move_balance(&mut state, from, to, amount)?;
        tracing::trace!(token = %self.symbol, %from, %to, amount, "transfer");
        Ok(())
    }

    fn transfer_from(
        &self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock();
        let key = (from.clone(), spender.clone());
        let allowed = state.allowances.get(&key).copied().unwrap_or(0);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from.to_string(),
                spender: spender.to_string(),
                needed: amount,
                available: allowed,
            });
        }
        move_balance(&mut state, from, to, amount)?;
        state.allowances.insert(key, allowed - amount);
        tracing::trace!(token = %self.symbol, %spender, %from, %to, amount, "transfer_from");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(name: &str) -> AccountId {
        AccountId::new(name)
    }

    #[test]
    fn mint_increases_balance_and_supply() {
        let token = MemoryToken::new("VOTE");
        token.mint(&acct("a"), 10).unwrap();
        token.mint(&acct("b"), 5).unwrap();
        assert_eq!(token.balance_of(&acct("a")), 10);
        assert_eq!(token.total_supply(), 15);
    }

    #[test]
    fn transfer_moves_funds() {
        let token = MemoryToken::new("STAKE");
        token.mint(&acct("a"), 10).unwrap();
        token.transfer(&acct("a"), &acct("b"), 4).unwrap();
        assert_eq!(token.balance_of(&acct("a")), 6);
        assert_eq!(token.balance_of(&acct("b")), 4);
        assert_eq!(token.total_supply(), 10);
    }

    #[test]
    fn transfer_rejects_overdraft_without_change() {
        let token = MemoryToken::new("STAKE");
        token.mint(&acct("a"), 3).unwrap();
        let err = token.transfer(&acct("a"), &acct("b"), 4).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { needed: 4, available: 3, .. }));
        assert_eq!(token.balance_of(&acct("a")), 3);
        assert_eq!(token.balance_of(&acct("b")), 0);
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let token = MemoryToken::new("STAKE");
        token.mint(&acct("owner"), 100).unwrap();
        token.approve(&acct("owner"), &acct("escrow"), 30);

        token
            .transfer_from(&acct("escrow"), &acct("owner"), &acct("escrow"), 20)
            .unwrap();
        assert_eq!(token.allowance(&acct("owner"), &acct("escrow")), 10);
        assert_eq!(token.balance_of(&acct("escrow")), 20);

        let err = token
            .transfer_from(&acct("escrow"), &acct("owner"), &acct("escrow"), 11)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));
        assert_eq!(token.allowance(&acct("owner"), &acct("escrow")), 10);
    }

    #[test]
    fn failed_transfer_from_keeps_allowance() {
        let token = MemoryToken::new("STAKE");
        token.mint(&acct("owner"), 5).unwrap();
        token.approve(&acct("owner"), &acct("escrow"), 50);
        assert!(token
            .transfer_from(&acct("escrow"), &acct("owner"), &acct("escrow"), 6)
            .is_err());
        assert_eq!(token.allowance(&acct("owner"), &acct("escrow")), 50);
    }

    #[test]
    fn burn_reduces_supply() {
        let token = MemoryToken::new("VOTE");
        token.mint(&acct("a"), 10).unwrap();
        token.burn(&acct("a"), 4).unwrap();
        assert_eq!(token.total_supply(), 6);
        assert!(token.burn(&acct("a"), 7).is_err());
    }

    #[test]
    fn snapshot_lists_nonzero_balances_sorted() {
        let token = MemoryToken::new("VOTE");
        token.mint(&acct("b"), 2).unwrap();
        token.mint(&acct("a"), 1).unwrap();
        token.transfer(&acct("a"), &acct("b"), 1).unwrap();
        let snap = token.snapshot();
        assert_eq!(snap.symbol, "VOTE");
        assert_eq!(snap.balances, vec![(acct("b"), 3)]);
    }
}

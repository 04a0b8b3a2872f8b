use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;
use tracing::info;

/// Errors surfaced by a ledger during a balance read or transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("insufficient funds in account `{0}`")]
    InsufficientFunds(String),
    #[error("unknown account `{0}`")]
    UnknownAccount(String),
}

/// The account ledger the engine moves funds through.
///
/// Transfers must be atomic: either both sides change by `amount` or neither
/// does. Implementations must be fast and must never call back into the book;
/// the matcher invokes `transfer` while holding the book lock.
pub trait Ledger: Send + Sync {
    /// Current balance in minor units.
    fn balance(&self, account_id: &str) -> Result<u64, LedgerError>;

    /// Move `amount` minor units from `from` to `to`.
    fn transfer(&self, from: &str, to: &str, amount: u64) -> Result<(), LedgerError>;
}

/// Reference ledger keeping balances in a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: Mutex<HashMap<String, u64>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or top up) an account with an opening balance.
    pub fn open_account(&self, account_id: impl Into<String>, balance: u64) {
        let mut accounts = self.accounts.lock().unwrap();
        *accounts.entry(account_id.into()).or_insert(0) += balance;
    }
}

impl Ledger for InMemoryLedger {
    fn balance(&self, account_id: &str) -> Result<u64, LedgerError> {
        let accounts = self.accounts.lock().unwrap();
        accounts
            .get(account_id)
            .copied()
            .ok_or_else(|| LedgerError::UnknownAccount(account_id.to_string()))
    }

    fn transfer(&self, from: &str, to: &str, amount: u64) -> Result<(), LedgerError> {
        // One lock for the whole transfer keeps the debit and credit atomic.
        let mut accounts = self.accounts.lock().unwrap();

        let from_balance = *accounts
            .get(from)
            .ok_or_else(|| LedgerError::UnknownAccount(from.to_string()))?;
        if !accounts.contains_key(to) {
            return Err(LedgerError::UnknownAccount(to.to_string()));
        }
        if from_balance < amount {
            return Err(LedgerError::InsufficientFunds(from.to_string()));
        }

        *accounts.get_mut(from).unwrap() -= amount;
        *accounts.get_mut(to).unwrap() += amount;
        info!("transferred {} from {} to {}", amount, from, to);
        Ok(())
    }
}

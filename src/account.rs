//! Account ledger: balance debit/credit and existence checks.
//!
//! The betting service never holds coins itself; a debited stake simply
//! leaves the better's balance and is tracked through the betting volume
//! stats until it is credited back or paid out.

use tracing::info;

use crate::errors::ChainError;
use crate::protocol::asset::Asset;
use crate::storage::objects::Account;
use crate::storage::Database;

impl Database {
    pub fn create_account(&mut self, name: &str, balance: Asset) -> Result<(), ChainError> {
        if self.accounts().contains_key(name) {
            return Err(ChainError::Validation(format!(
                "account already exists: {}",
                name
            )));
        }
        self.accounts_mut().insert(
            name.to_string(),
            Account {
                name: name.to_string(),
                balance,
            },
        );
        Ok(())
    }

    pub fn account_exists(&self, name: &str) -> bool {
        self.accounts().contains_key(name)
    }

    pub fn check_account_existence(&self, name: &str) -> Result<(), ChainError> {
        if !self.account_exists(name) {
            return Err(ChainError::UnknownAccount(name.to_string()));
        }
        Ok(())
    }

    pub fn balance(&self, name: &str) -> Asset {
        self.accounts()
            .get(name)
            .map(|a| a.balance)
            .unwrap_or(Asset::ZERO)
    }

    pub fn credit(&mut self, name: &str, amount: Asset) -> Result<(), ChainError> {
        let account = self
            .accounts_mut()
            .get_mut(name)
            .ok_or_else(|| ChainError::UnknownAccount(name.to_string()))?;
        account.balance += amount;
        let new_balance = account.balance;
        info!(account = %name, amount = %amount, balance = %new_balance, "balance credited");
        Ok(())
    }

    pub fn debit(&mut self, name: &str, amount: Asset) -> Result<(), ChainError> {
        let account = self
            .accounts_mut()
            .get_mut(name)
            .ok_or_else(|| ChainError::UnknownAccount(name.to_string()))?;
        if account.balance < amount {
            return Err(ChainError::InsufficientFunds {
                have: account.balance,
                need: amount,
            });
        }
        account.balance -= amount;
        let new_balance = account.balance;
        info!(account = %name, amount = %amount, balance = %new_balance, "balance debited");
        Ok(())
    }
}

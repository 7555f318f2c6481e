use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type AccountId = i64;

/// Money is an integer count of the currency's smallest unit (cents for USD/EUR).
pub type Amount = i64;

/// An internal account. `balance` is the only mutable aggregate in the ledger and
/// only ever changes together with the entry or transfer record that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Identity of the owner in the external user system
    pub owner: String,
    pub balance: Amount,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn holds_currency(&self, currency: &str) -> bool {
        self.currency == currency
    }

    pub fn covers(&self, amount: Amount) -> bool {
        self.balance >= amount
    }
}

/// Parameters for opening an account. The id and timestamp are assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub owner: String,
    pub currency: String,
    pub balance: Amount,
}

impl NewAccount {
    pub fn new(owner: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            currency: currency.into(),
            balance: 0,
        }
    }

    pub fn with_balance(mut self, balance: Amount) -> Self {
        self.balance = balance;
        self
    }
}

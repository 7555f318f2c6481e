use thiserror::Error;

use crate::domain::{AccountId, Amount};
use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Account {account_id} currency mismatch: {account_currency} vs {requested}")]
    CurrencyMismatch {
        account_id: AccountId,
        account_currency: String,
        requested: String,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient funds in account {account_id}: balance {balance}, required {required}")]
    InsufficientFunds {
        account_id: AccountId,
        balance: Amount,
        required: Amount,
    },

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound {
                entity: "account",
                id,
            } => AppError::AccountNotFound(id),
            other => AppError::Store(other),
        }
    }
}

//! Checks a caller runs before handing parameters to the transfer service.
//!
//! The orchestrators trust their inputs; these functions are how a request
//! layer establishes that trust. They read through standalone queries and must
//! not be called from inside a unit of work.

use crate::domain::{Account, AccountId, Amount, BankDirection};
use crate::storage::LedgerQueries;

use super::{AppError, BankTxParams, TransferTxParams};

pub fn require_positive(amount: Amount) -> Result<(), AppError> {
    if amount <= 0 {
        return Err(AppError::InvalidAmount(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

/// Load an account and confirm it is denominated in `currency`.
pub async fn require_account(
    queries: &mut dyn LedgerQueries,
    account_id: AccountId,
    currency: &str,
) -> Result<Account, AppError> {
    let account = queries.get_account(account_id).await?;
    if !account.holds_currency(currency) {
        return Err(AppError::CurrencyMismatch {
            account_id,
            account_currency: account.currency,
            requested: currency.to_string(),
        });
    }
    Ok(account)
}

pub fn require_funds(account: &Account, amount: Amount) -> Result<(), AppError> {
    if !account.covers(amount) {
        return Err(AppError::InsufficientFunds {
            account_id: account.id,
            balance: account.balance,
            required: amount,
        });
    }
    Ok(())
}

/// Both accounts exist and share `currency`, and the amount is positive.
/// Returns `(from, to)` as read before the transfer.
pub async fn preflight_transfer(
    queries: &mut dyn LedgerQueries,
    params: &TransferTxParams,
    currency: &str,
) -> Result<(Account, Account), AppError> {
    require_positive(params.amount)?;
    let from = require_account(queries, params.from_account_id, currency).await?;
    let to = require_account(queries, params.to_account_id, currency).await?;
    Ok((from, to))
}

/// The account exists in `currency` and the amount is positive. Outbound
/// transfers additionally need the balance to cover the amount.
pub async fn preflight_bank_transfer(
    queries: &mut dyn LedgerQueries,
    params: &BankTxParams,
    currency: &str,
    direction: BankDirection,
) -> Result<Account, AppError> {
    require_positive(params.amount)?;
    let account = require_account(queries, params.account_id, currency).await?;
    if direction == BankDirection::Outbound {
        require_funds(&account, params.amount)?;
    }
    Ok(account)
}

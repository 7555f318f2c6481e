//! Multi-step ledger mutations. Each function here is the body of exactly one
//! unit of work: it takes query primitives already bound to a transaction and
//! never commits, rolls back or performs any I/O beyond those primitives.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Account, AccountId, Amount, BalanceDelta, BankAccountId, BankDirection, Entry, Transfer,
    TransfersBank, lock_order,
};
use crate::storage::{LedgerQueries, StoreError, StoreResult};

/// Input of an internal account-to-account transfer.
/// `amount > 0` is a precondition checked by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTxParams {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Amount,
}

/// Everything created or updated by one internal transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTxResult {
    pub transfer: Transfer,
    pub from_account: Account,
    pub to_account: Account,
    pub from_entry: Entry,
    pub to_entry: Entry,
}

/// Input of a transfer between an internal account and an external bank account.
/// `amount` is the positive gross amount; the direction supplies the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTxParams {
    pub account_id: AccountId,
    pub bank_account_id: BankAccountId,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTxResult {
    pub direction: BankDirection,
    pub transfer: TransfersBank,
    pub account: Account,
}

/// Apply balance deltas one row at a time in ascending account-id order.
///
/// Returns the updated accounts in the order of `deltas`, not in lock order.
/// Any path that changes more than one balance in a unit of work must go
/// through here.
pub async fn apply_in_lock_order(
    queries: &mut dyn LedgerQueries,
    deltas: &[BalanceDelta],
) -> StoreResult<Vec<Account>> {
    let mut updated = Vec::with_capacity(deltas.len());
    for index in lock_order(deltas) {
        let BalanceDelta { account_id, delta } = deltas[index];
        let account = queries.add_account_balance(account_id, delta).await?;
        updated.push((index, account));
    }

    updated.sort_by_key(|(index, _)| *index);
    Ok(updated.into_iter().map(|(_, account)| account).collect())
}

/// Move `amount` from one account to another: one transfer record, a debit and
/// a credit entry, and both balance updates.
pub async fn transfer_tx(
    queries: &mut dyn LedgerQueries,
    params: TransferTxParams,
) -> StoreResult<TransferTxResult> {
    let TransferTxParams {
        from_account_id,
        to_account_id,
        amount,
    } = params;

    let transfer = queries
        .create_transfer(from_account_id, to_account_id, amount)
        .await?;
    let from_entry = queries.create_entry(from_account_id, -amount).await?;
    let to_entry = queries.create_entry(to_account_id, amount).await?;

    let deltas = [
        BalanceDelta::new(from_account_id, -amount),
        BalanceDelta::new(to_account_id, amount),
    ];
    let [from_account, to_account] = <[Account; 2]>::try_from(
        apply_in_lock_order(queries, &deltas).await?,
    )
    .map_err(|_| StoreError::Internal("balance update count differs from deltas"))?;

    Ok(TransferTxResult {
        transfer,
        from_account,
        to_account,
        from_entry,
        to_entry,
    })
}

/// Record a bank transfer and apply it to the internal account's balance.
///
/// No balance sufficiency check happens here: an outbound transfer larger than
/// the balance drives it negative. Overdraft policy belongs to the caller.
pub async fn bank_tx(
    queries: &mut dyn LedgerQueries,
    params: BankTxParams,
    direction: BankDirection,
) -> StoreResult<BankTxResult> {
    let amount = direction.signed(params.amount);

    let transfer = queries
        .create_transfer_bank(params.account_id, params.bank_account_id, amount)
        .await?;
    let account = queries
        .add_account_balance(params.account_id, amount)
        .await?;

    Ok(BankTxResult {
        direction,
        transfer,
        account,
    })
}

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domain::{Account, AccountId, BankDirection, Entry, Transfer, TransfersBank};
use crate::storage::{Page, TxExecutor};

use super::{
    AppError, BankTxParams, BankTxResult, TransferTxParams, TransferTxResult, bank_tx, transfer_tx,
};

/// Entry points for moving money. Each call is one unit of work on the
/// injected executor: it either fully applies or leaves no trace.
///
/// Inputs are trusted. Run the [`preflight`](super::preflight) checks first,
/// and keep notifications or other network calls outside these methods so no
/// database lock is held across them.
pub struct TransferService<X> {
    executor: X,
}

/// An account together with its ledger trail, read from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountHistory {
    pub account: Account,
    pub entries: Vec<Entry>,
    pub transfers: Vec<Transfer>,
    pub bank_transfers: Vec<TransfersBank>,
}

impl<X: TxExecutor> TransferService<X> {
    pub fn new(executor: X) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    /// Move money between two internal accounts.
    #[instrument(skip(self))]
    pub async fn transfer(&self, params: TransferTxParams) -> Result<TransferTxResult, AppError> {
        let result = self
            .executor
            .execute(move |queries| Box::pin(transfer_tx(queries, params)))
            .await?;

        info!(
            transfer_id = result.transfer.id,
            from_balance = result.from_account.balance,
            to_balance = result.to_account.balance,
            "transfer committed"
        );
        Ok(result)
    }

    /// Debit an internal account for money sent to an external bank account.
    /// The balance is not checked; see [`preflight_bank_transfer`](super::preflight_bank_transfer).
    pub async fn send_to_bank(&self, params: BankTxParams) -> Result<BankTxResult, AppError> {
        self.bank_transfer(params, BankDirection::Outbound).await
    }

    /// Credit an internal account for money received from an external bank account.
    pub async fn receive_from_bank(&self, params: BankTxParams) -> Result<BankTxResult, AppError> {
        self.bank_transfer(params, BankDirection::Inbound).await
    }

    #[instrument(skip(self))]
    async fn bank_transfer(
        &self,
        params: BankTxParams,
        direction: BankDirection,
    ) -> Result<BankTxResult, AppError> {
        let result = self
            .executor
            .execute(move |queries| Box::pin(bank_tx(queries, params, direction)))
            .await?;

        info!(
            bank_transfer_id = result.transfer.id,
            balance = result.account.balance,
            "bank transfer committed"
        );
        Ok(result)
    }

    pub async fn account(&self, account_id: AccountId) -> Result<Account, AppError> {
        let account = self
            .executor
            .execute(move |queries| Box::pin(async move { queries.get_account(account_id).await }))
            .await?;
        Ok(account)
    }

    /// An account and one page of each of its entries, transfers and bank transfers.
    pub async fn account_history(
        &self,
        account_id: AccountId,
        page: Page,
    ) -> Result<AccountHistory, AppError> {
        let history = self
            .executor
            .execute(move |queries| {
                Box::pin(async move {
                    let account = queries.get_account(account_id).await?;
                    let entries = queries.list_entries(account_id, page).await?;
                    let transfers = queries.list_transfers(account_id, page).await?;
                    let bank_transfers = queries.list_transfers_bank(account_id, page).await?;
                    Ok(AccountHistory {
                        account,
                        entries,
                        transfers,
                        bank_transfers,
                    })
                })
            })
            .await?;
        Ok(history)
    }
}

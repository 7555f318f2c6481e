// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use psp_ledger::application::TransferService;
use psp_ledger::domain::{Account, Amount, NewAccount};
use psp_ledger::storage::{LedgerQueries, SqliteStore};
use psp_ledger::LedgerConfig;
use sqlx::Row;
use tempfile::TempDir;

/// Helper to create a migrated store backed by a temporary database file
pub async fn test_store() -> Result<(SqliteStore, TempDir)> {
    let temp_dir = TempDir::new()?;
    let config = LedgerConfig::for_path(temp_dir.path().join("test.db"));
    let store = SqliteStore::init(&config).await?;
    Ok((store, temp_dir))
}

/// Helper to create a transfer service over a fresh store
pub async fn test_service() -> Result<(TransferService<SqliteStore>, TempDir)> {
    let (store, temp_dir) = test_store().await?;
    Ok((TransferService::new(store), temp_dir))
}

/// Open an account outside any unit of work
pub async fn open_account(
    store: &SqliteStore,
    owner: &str,
    currency: &str,
    balance: Amount,
) -> Result<Account> {
    let new = NewAccount::new(owner, currency).with_balance(balance);
    Ok(store.queries().await?.create_account(&new).await?)
}

pub async fn balance_of(store: &SqliteStore, account: &Account) -> Result<Amount> {
    Ok(store.queries().await?.get_account(account.id).await?.balance)
}

/// Count rows in one of the ledger tables
pub async fn count_rows(store: &SqliteStore, table: &str) -> Result<i64> {
    let row = sqlx::query(&format!("SELECT COUNT(*) AS count FROM {table}"))
        .fetch_one(store.pool())
        .await?;
    Ok(row.get("count"))
}

/// Standard USD accounts: alice with 100, bob with 50
pub struct StandardAccounts {
    pub alice: Account,
    pub bob: Account,
}

impl StandardAccounts {
    pub async fn create(store: &SqliteStore) -> Result<Self> {
        let alice = open_account(store, "alice", "USD", 100).await?;
        let bob = open_account(store, "bob", "USD", 50).await?;
        Ok(Self { alice, bob })
    }
}

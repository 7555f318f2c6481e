use std::ops::DerefMut;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::domain::{
    Account, AccountId, Amount, BankAccountId, BankTransferId, Entry, EntryId, NewAccount,
    Transfer, TransferId, TransfersBank,
};

use super::{StoreError, StoreResult};

/// Window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(50, 0)
    }
}

/// Primitive reads and writes against single ledger entities.
///
/// None of these open a transaction. Bound to a unit of work (see
/// [`TxExecutor`](super::TxExecutor)) they take part in it; bound to a plain
/// pooled connection each call stands alone.
#[async_trait]
pub trait LedgerQueries: Send {
    async fn create_account(&mut self, account: &NewAccount) -> StoreResult<Account>;

    /// Fails with [`StoreError::NotFound`] when no account has this id.
    async fn get_account(&mut self, id: AccountId) -> StoreResult<Account>;

    async fn list_accounts(&mut self, owner: &str, page: Page) -> StoreResult<Vec<Account>>;

    /// Add `delta` to the stored balance in one read-modify-write statement and
    /// return the updated row. This is the only way balances change.
    async fn add_account_balance(&mut self, id: AccountId, delta: Amount) -> StoreResult<Account>;

    async fn create_entry(&mut self, account_id: AccountId, amount: Amount) -> StoreResult<Entry>;

    async fn get_entry(&mut self, id: EntryId) -> StoreResult<Entry>;

    async fn list_entries(&mut self, account_id: AccountId, page: Page) -> StoreResult<Vec<Entry>>;

    async fn create_transfer(
        &mut self,
        from_account_id: AccountId,
        to_account_id: AccountId,
        amount: Amount,
    ) -> StoreResult<Transfer>;

    async fn get_transfer(&mut self, id: TransferId) -> StoreResult<Transfer>;

    /// Transfers where the account is either the source or the destination.
    async fn list_transfers(
        &mut self,
        account_id: AccountId,
        page: Page,
    ) -> StoreResult<Vec<Transfer>>;

    /// `amount` is stored with the caller's sign: negative outbound, positive inbound.
    async fn create_transfer_bank(
        &mut self,
        account_id: AccountId,
        bank_account_id: BankAccountId,
        amount: Amount,
    ) -> StoreResult<TransfersBank>;

    async fn get_transfer_bank(&mut self, id: BankTransferId) -> StoreResult<TransfersBank>;

    async fn list_transfers_bank(
        &mut self,
        account_id: AccountId,
        page: Page,
    ) -> StoreResult<Vec<TransfersBank>>;
}

/// SQLite implementation of [`LedgerQueries`] over any handle that derefs to a
/// connection: a transaction's connection or a connection checked out of the pool.
pub struct Queries<C> {
    conn: C,
}

impl<C> Queries<C> {
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> LedgerQueries for Queries<C>
where
    C: DerefMut<Target = SqliteConnection> + Send,
{
    async fn create_account(&mut self, account: &NewAccount) -> StoreResult<Account> {
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (owner, balance, currency, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, owner, balance, currency, created_at
            "#,
        )
        .bind(&account.owner)
        .bind(account.balance)
        .bind(&account.currency)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&mut *self.conn)
        .await?;

        row_to_account(&row)
    }

    async fn get_account(&mut self, id: AccountId) -> StoreResult<Account> {
        let row = sqlx::query(
            r#"
            SELECT id, owner, balance, currency, created_at
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        match row {
            Some(row) => row_to_account(&row),
            None => Err(StoreError::not_found("account", id)),
        }
    }

    async fn list_accounts(&mut self, owner: &str, page: Page) -> StoreResult<Vec<Account>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner, balance, currency, created_at
            FROM accounts
            WHERE owner = ?
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(owner)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.iter().map(row_to_account).collect()
    }

    async fn add_account_balance(&mut self, id: AccountId, delta: Amount) -> StoreResult<Account> {
        let row = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance + ?
            WHERE id = ?
            RETURNING id, owner, balance, currency, created_at
            "#,
        )
        .bind(delta)
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        match row {
            Some(row) => row_to_account(&row),
            None => Err(StoreError::not_found("account", id)),
        }
    }

    async fn create_entry(&mut self, account_id: AccountId, amount: Amount) -> StoreResult<Entry> {
        let row = sqlx::query(
            r#"
            INSERT INTO entries (account_id, amount, created_at)
            VALUES (?, ?, ?)
            RETURNING id, account_id, amount, created_at
            "#,
        )
        .bind(account_id)
        .bind(amount)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&mut *self.conn)
        .await?;

        row_to_entry(&row)
    }

    async fn get_entry(&mut self, id: EntryId) -> StoreResult<Entry> {
        let row = sqlx::query("SELECT id, account_id, amount, created_at FROM entries WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        match row {
            Some(row) => row_to_entry(&row),
            None => Err(StoreError::not_found("entry", id)),
        }
    }

    async fn list_entries(&mut self, account_id: AccountId, page: Page) -> StoreResult<Vec<Entry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, amount, created_at
            FROM entries
            WHERE account_id = ?
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(account_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.iter().map(row_to_entry).collect()
    }

    async fn create_transfer(
        &mut self,
        from_account_id: AccountId,
        to_account_id: AccountId,
        amount: Amount,
    ) -> StoreResult<Transfer> {
        let row = sqlx::query(
            r#"
            INSERT INTO transfers (from_account_id, to_account_id, amount, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, from_account_id, to_account_id, amount, created_at
            "#,
        )
        .bind(from_account_id)
        .bind(to_account_id)
        .bind(amount)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&mut *self.conn)
        .await?;

        row_to_transfer(&row)
    }

    async fn get_transfer(&mut self, id: TransferId) -> StoreResult<Transfer> {
        let row = sqlx::query(
            r#"
            SELECT id, from_account_id, to_account_id, amount, created_at
            FROM transfers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        match row {
            Some(row) => row_to_transfer(&row),
            None => Err(StoreError::not_found("transfer", id)),
        }
    }

    async fn list_transfers(
        &mut self,
        account_id: AccountId,
        page: Page,
    ) -> StoreResult<Vec<Transfer>> {
        let rows = sqlx::query(
            r#"
            SELECT id, from_account_id, to_account_id, amount, created_at
            FROM transfers
            WHERE from_account_id = ? OR to_account_id = ?
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(account_id)
        .bind(account_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.iter().map(row_to_transfer).collect()
    }

    async fn create_transfer_bank(
        &mut self,
        account_id: AccountId,
        bank_account_id: BankAccountId,
        amount: Amount,
    ) -> StoreResult<TransfersBank> {
        let row = sqlx::query(
            r#"
            INSERT INTO transfers_bank (account_id, bank_account_id, amount, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, account_id, bank_account_id, amount, created_at
            "#,
        )
        .bind(account_id)
        .bind(bank_account_id)
        .bind(amount)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&mut *self.conn)
        .await?;

        row_to_transfer_bank(&row)
    }

    async fn get_transfer_bank(&mut self, id: BankTransferId) -> StoreResult<TransfersBank> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id, bank_account_id, amount, created_at
            FROM transfers_bank
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        match row {
            Some(row) => row_to_transfer_bank(&row),
            None => Err(StoreError::not_found("bank transfer", id)),
        }
    }

    async fn list_transfers_bank(
        &mut self,
        account_id: AccountId,
        page: Page,
    ) -> StoreResult<Vec<TransfersBank>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, bank_account_id, amount, created_at
            FROM transfers_bank
            WHERE account_id = ?
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(account_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.iter().map(row_to_transfer_bank).collect()
    }
}

fn parse_timestamp(row: &SqliteRow) -> StoreResult<DateTime<Utc>> {
    let created_at: String = row.try_get("created_at")?;
    DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Decode(format!("created_at {created_at:?}: {e}")))
}

fn row_to_account(row: &SqliteRow) -> StoreResult<Account> {
    Ok(Account {
        id: row.try_get("id")?,
        owner: row.try_get("owner")?,
        balance: row.try_get("balance")?,
        currency: row.try_get("currency")?,
        created_at: parse_timestamp(row)?,
    })
}

fn row_to_entry(row: &SqliteRow) -> StoreResult<Entry> {
    Ok(Entry {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        amount: row.try_get("amount")?,
        created_at: parse_timestamp(row)?,
    })
}

fn row_to_transfer(row: &SqliteRow) -> StoreResult<Transfer> {
    Ok(Transfer {
        id: row.try_get("id")?,
        from_account_id: row.try_get("from_account_id")?,
        to_account_id: row.try_get("to_account_id")?,
        amount: row.try_get("amount")?,
        created_at: parse_timestamp(row)?,
    })
}

fn row_to_transfer_bank(row: &SqliteRow) -> StoreResult<TransfersBank> {
    Ok(TransfersBank {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        bank_account_id: row.try_get("bank_account_id")?,
        amount: row.try_get("amount")?,
        created_at: parse_timestamp(row)?,
    })
}

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, error, info, warn};

use crate::config::LedgerConfig;

use super::{LedgerQueries, MIGRATION_001_INITIAL, Queries, StoreError, StoreResult};

/// Runs a unit of work atomically.
///
/// `work` receives query primitives bound to a fresh transaction. If it
/// returns `Ok` the transaction commits; if it returns `Err` the transaction
/// rolls back and the error is returned (wrapped in
/// [`StoreError::RollbackFailed`] when the rollback fails too). The handle is
/// borrowed for the duration of `work` only and cannot escape it.
#[async_trait]
pub trait TxExecutor: Send + Sync {
    async fn execute<T, F>(&self, work: F) -> StoreResult<T>
    where
        T: Send,
        F: for<'q> FnOnce(&'q mut dyn LedgerQueries) -> BoxFuture<'q, StoreResult<T>> + Send;
}

/// SQLite-backed ledger store. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    tx_timeout: Option<Duration>,
}

impl SqliteStore {
    /// Create a store over an existing pool. The caller owns the pool's lifecycle.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            tx_timeout: None,
        }
    }

    /// Abort any unit of work still running after `timeout`.
    pub fn with_tx_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tx_timeout = timeout;
        self
    }

    /// Connect to the database described by `config`.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(config: &LedgerConfig) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout());

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        info!(url = %config.database_url, "connected to ledger database");
        Ok(Self::new(pool).with_tx_timeout(config.tx_timeout()))
    }

    /// Create the ledger schema. Safe to run against an initialized database.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await?;
        debug!("ledger schema up to date");
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(config: &LedgerConfig) -> StoreResult<Self> {
        let store = Self::connect(config).await?;
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Query primitives on a pooled connection, outside any unit of work.
    /// Every call commits on its own.
    pub async fn queries(&self) -> StoreResult<Queries<PoolConnection<Sqlite>>> {
        Ok(Queries::new(self.pool.acquire().await?))
    }
}

#[async_trait]
impl TxExecutor for SqliteStore {
    async fn execute<T, F>(&self, work: F) -> StoreResult<T>
    where
        T: Send,
        F: for<'q> FnOnce(&'q mut dyn LedgerQueries) -> BoxFuture<'q, StoreResult<T>> + Send,
    {
        // If this future is dropped before finishing, dropping `tx` rolls it back.
        let mut tx = self.pool.begin().await?;

        let outcome = {
            let mut queries = Queries::new(&mut *tx);
            let work = work(&mut queries);
            match self.tx_timeout {
                Some(limit) => match tokio::time::timeout(limit, work).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(?limit, "unit of work timed out");
                        Err(StoreError::TimedOut(limit))
                    }
                },
                None => work.await,
            }
        };

        match outcome {
            Ok(value) => {
                tx.commit().await?;
                debug!("unit of work committed");
                Ok(value)
            }
            Err(err) => {
                let rollback = tx.rollback().await;
                match &rollback {
                    Ok(()) => debug!(error = %err, "unit of work rolled back"),
                    Err(rb) => error!(error = %err, rollback_error = %rb, "rollback failed"),
                }
                Err(err.after_rollback(rollback))
            }
        }
    }
}

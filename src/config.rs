//! Runtime configuration for the ledger store.
//!
//! Values come from defaults, then environment variables (a `.env` file is
//! loaded by the binary before this runs), then command-line flags.

use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:psp-ledger.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// SQLite connection URL
    pub database_url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// How long a statement waits on a locked database before failing, in milliseconds
    pub busy_timeout_ms: u64,
    /// Deadline for one unit of work, in milliseconds. `None` means no deadline.
    pub tx_timeout_ms: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 10,
            busy_timeout_ms: 30_000,
            tx_timeout_ms: None,
        }
    }
}

impl LedgerConfig {
    /// Config pointing at a database file on disk.
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        Self {
            database_url: format!("sqlite:{}", path.as_ref().display()),
            ..Default::default()
        }
    }

    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup. Unparseable values fall
    /// back to the default for that key, as does a zero connection limit.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: lookup("LEDGER_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_connections),
            busy_timeout_ms: lookup("LEDGER_BUSY_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.busy_timeout_ms),
            tx_timeout_ms: lookup("LEDGER_TX_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .or(defaults.tx_timeout_ms),
        }
    }

    pub fn with_tx_timeout(mut self, timeout: Duration) -> Self {
        self.tx_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn tx_timeout(&self) -> Option<Duration> {
        self.tx_timeout_ms.map(Duration::from_millis)
    }
}

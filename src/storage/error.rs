use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Unit of work timed out after {0:?}")]
    TimedOut(Duration),

    /// The unit of work failed and the rollback that followed failed too.
    /// `source` is the original failure; `rollback` is why the rollback failed.
    #[error("Unit of work failed ({source}) and rollback failed ({rollback})")]
    RollbackFailed {
        source: Box<StoreError>,
        rollback: sqlx::Error,
    },

    #[error("Invalid stored value: {0}")]
    Decode(String),

    /// A ledger invariant the code itself should uphold did not hold.
    #[error("Internal ledger error: {0}")]
    Internal(&'static str),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        StoreError::NotFound { entity, id }
    }

    /// Combine a unit-of-work failure with the outcome of the rollback it
    /// triggered. A successful rollback yields the original error unchanged.
    pub fn after_rollback(self, rollback: Result<(), sqlx::Error>) -> Self {
        match rollback {
            Ok(()) => self,
            Err(rollback) => StoreError::RollbackFailed {
                source: Box::new(self),
                rollback,
            },
        }
    }

    /// The failure that started the unit of work's abort, looking through a
    /// failed rollback.
    pub fn root(&self) -> &StoreError {
        match self {
            StoreError::RollbackFailed { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, Amount};

pub type TransferId = i64;

/// A transfer records one internal movement of money between two accounts.
/// Transfers are immutable; the matching balance changes are carried by entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    /// Source account (balance decreases)
    pub from_account_id: AccountId,
    /// Destination account (balance increases)
    pub to_account_id: AccountId,
    /// Gross amount moved (always positive)
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
}

impl Transfer {
    /// Signed effect of this transfer on the given account's balance.
    pub fn delta_for(&self, account_id: AccountId) -> Amount {
        let mut delta = 0;
        if self.from_account_id == account_id {
            delta -= self.amount;
        }
        if self.to_account_id == account_id {
            delta += self.amount;
        }
        delta
    }
}

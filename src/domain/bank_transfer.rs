use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, Amount};

pub type BankTransferId = i64;

/// Reference to an account held at an external bank.
pub type BankAccountId = i64;

/// Direction of money crossing the boundary between an internal account and an
/// external bank, seen from the internal account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankDirection {
    /// Internal account -> external bank (stored as a negative amount)
    Outbound,
    /// External bank -> internal account (stored as a positive amount)
    Inbound,
}

impl BankDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            BankDirection::Outbound => "outbound",
            BankDirection::Inbound => "inbound",
        }
    }

    /// Apply this direction's sign to a positive gross amount.
    pub fn signed(&self, amount: Amount) -> Amount {
        match self {
            BankDirection::Outbound => -amount,
            BankDirection::Inbound => amount,
        }
    }

    /// Recover the direction from a stored signed amount.
    pub fn of(signed_amount: Amount) -> Self {
        if signed_amount < 0 {
            BankDirection::Outbound
        } else {
            BankDirection::Inbound
        }
    }
}

impl std::fmt::Display for BankDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record of money moving between an internal account and an external bank
/// account. The sign of `amount` encodes the direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransfersBank {
    pub id: BankTransferId,
    pub account_id: AccountId,
    pub bank_account_id: BankAccountId,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
}

impl TransfersBank {
    pub fn direction(&self) -> BankDirection {
        BankDirection::of(self.amount)
    }
}

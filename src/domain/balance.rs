use serde::{Deserialize, Serialize};

use super::{AccountId, Amount};

/// A pending signed change to one account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub account_id: AccountId,
    pub delta: Amount,
}

impl BalanceDelta {
    pub fn new(account_id: AccountId, delta: Amount) -> Self {
        Self { account_id, delta }
    }
}

/// Order in which balance updates must be issued: ascending account id.
///
/// Returns indices into `deltas`. Every unit of work that updates more than one
/// account row acquires the row locks in this order, so two transactions
/// touching the same accounts can never wait on each other in a cycle.
/// The sort is stable: deltas for the same account keep their input order.
pub fn lock_order(deltas: &[BalanceDelta]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..deltas.len()).collect();
    order.sort_by_key(|&index| deltas[index].account_id);
    order
}

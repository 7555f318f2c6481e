mod common;

use std::sync::Arc;

use anyhow::Result;
use common::{StandardAccounts, balance_of, count_rows, test_service};
use psp_ledger::application::TransferTxParams;

const ROUNDS: usize = 5;
const TRANSFERS_PER_ROUND: usize = 10;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_direction_transfers_lose_no_updates() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let service = Arc::new(service);
    let StandardAccounts { alice, bob } = StandardAccounts::create(service.executor()).await?;
    let amount = 10;

    let mut handles = Vec::new();
    for i in 0..TRANSFERS_PER_ROUND {
        let service = Arc::clone(&service);
        let (from, to) = if i % 2 == 0 {
            (alice.id, bob.id)
        } else {
            (bob.id, alice.id)
        };
        handles.push(tokio::spawn(async move {
            service
                .transfer(TransferTxParams {
                    from_account_id: from,
                    to_account_id: to,
                    amount,
                })
                .await
        }));
    }

    for handle in handles {
        handle.await??;
    }

    // Even split of directions: every debit is matched by a credit
    let store = service.executor();
    assert_eq!(balance_of(store, &alice).await?, 100);
    assert_eq!(balance_of(store, &bob).await?, 50);
    assert_eq!(count_rows(store, "transfers").await?, TRANSFERS_PER_ROUND as i64);
    assert_eq!(count_rows(store, "entries").await?, 2 * TRANSFERS_PER_ROUND as i64);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_one_way_transfers_apply_every_delta() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let service = Arc::new(service);
    let StandardAccounts { alice, bob } = StandardAccounts::create(service.executor()).await?;
    let (alice_id, bob_id) = (alice.id, bob.id);

    let handles: Vec<_> = (0..TRANSFERS_PER_ROUND)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .transfer(TransferTxParams {
                        from_account_id: alice_id,
                        to_account_id: bob_id,
                        amount: 3,
                    })
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await??;
    }

    let moved = 3 * TRANSFERS_PER_ROUND as i64;
    let store = service.executor();
    assert_eq!(balance_of(store, &alice).await?, 100 - moved);
    assert_eq!(balance_of(store, &bob).await?, 50 + moved);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_opposite_direction_transfers_never_deadlock() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let service = Arc::new(service);
    let StandardAccounts { alice, bob } = StandardAccounts::create(service.executor()).await?;
    let (alice_id, bob_id) = (alice.id, bob.id);

    for round in 0..ROUNDS {
        let forward = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .transfer(TransferTxParams {
                        from_account_id: alice_id,
                        to_account_id: bob_id,
                        amount: 4,
                    })
                    .await
            })
        };
        let backward = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .transfer(TransferTxParams {
                        from_account_id: bob_id,
                        to_account_id: alice_id,
                        amount: 1,
                    })
                    .await
            })
        };

        let (forward, backward) = tokio::join!(forward, backward);
        forward??;
        backward??;

        let store = service.executor();
        let net = 3 * (round as i64 + 1);
        assert_eq!(balance_of(store, &alice).await?, 100 - net);
        assert_eq!(balance_of(store, &bob).await?, 50 + net);
    }
    Ok(())
}

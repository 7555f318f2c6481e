mod common;

use std::time::Duration;

use anyhow::Result;
use common::{count_rows, open_account, test_store};
use psp_ledger::domain::NewAccount;
use psp_ledger::storage::{LedgerQueries, StoreError, TxExecutor};

#[tokio::test]
async fn test_committed_work_is_visible() -> Result<()> {
    let (store, _temp) = test_store().await?;

    let account = store
        .execute(|queries| {
            Box::pin(async move {
                let account = queries.create_account(&NewAccount::new("ann", "USD")).await?;
                queries.add_account_balance(account.id, 25).await
            })
        })
        .await?;

    assert_eq!(account.balance, 25);
    let stored = store.queries().await?.get_account(account.id).await?;
    assert_eq!(stored, account);
    Ok(())
}

#[tokio::test]
async fn test_failed_work_rolls_back_every_write() -> Result<()> {
    let (store, _temp) = test_store().await?;
    let existing = open_account(&store, "ben", "USD", 10).await?;
    let existing_id = existing.id;

    let result = store
        .execute(move |queries| {
            Box::pin(async move {
                queries.create_account(&NewAccount::new("cat", "USD")).await?;
                queries.add_account_balance(existing_id, 500).await?;
                Err::<(), _>(StoreError::Decode("forced".to_string()))
            })
        })
        .await;

    assert!(matches!(result, Err(StoreError::Decode(ref msg)) if msg == "forced"));
    assert_eq!(count_rows(&store, "accounts").await?, 1);
    let balance = store.queries().await?.get_account(existing_id).await?.balance;
    assert_eq!(balance, 10);
    Ok(())
}

#[tokio::test]
async fn test_not_found_inside_work_aborts() -> Result<()> {
    let (store, _temp) = test_store().await?;

    let result = store
        .execute(|queries| Box::pin(async move { queries.add_account_balance(77, 5).await }))
        .await;

    let err = result.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_timed_out_work_is_rolled_back() -> Result<()> {
    let (store, _temp) = test_store().await?;
    let store = store.with_tx_timeout(Some(Duration::from_millis(50)));

    let result = store
        .execute(|queries| {
            Box::pin(async move {
                queries.create_account(&NewAccount::new("dan", "USD")).await?;
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, StoreError>(())
            })
        })
        .await;

    assert!(matches!(result, Err(StoreError::TimedOut(limit)) if limit == Duration::from_millis(50)));
    assert_eq!(count_rows(&store, "accounts").await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_uncommitted_writes_are_invisible_outside() -> Result<()> {
    let (store, _temp) = test_store().await?;
    let observer = store.clone();

    let seen_inside = store
        .execute(move |queries| {
            Box::pin(async move {
                let account = queries.create_account(&NewAccount::new("eve", "USD")).await?;
                let mut outside = observer.queries().await?;
                let seen = outside.list_accounts("eve", Default::default()).await?;
                // Our own handle sees the row
                queries.get_account(account.id).await?;
                Ok::<_, StoreError>(seen.len())
            })
        })
        .await?;

    assert_eq!(seen_inside, 0);
    assert_eq!(count_rows(&store, "accounts").await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_dropped_work_leaves_no_rows() -> Result<()> {
    let (store, _temp) = test_store().await?;
    let runner = store.clone();

    let handle = tokio::spawn(async move {
        runner
            .execute(|queries| {
                Box::pin(async move {
                    queries.create_account(&NewAccount::new("fay", "USD")).await?;
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok::<_, StoreError>(())
                })
            })
            .await
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());

    assert_eq!(count_rows(&store, "accounts").await?, 0);
    Ok(())
}

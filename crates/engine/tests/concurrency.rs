mod common;

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::task::JoinSet;

use common::{engine_with_file_db, input};
use engine::{TransactionFilter, TransactionKind};

const WRITERS: usize = 40;
const UPDATERS: usize = 30;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_never_lose_an_increment() {
    let fx = engine_with_file_db().await;
    let checking = fx.account("Checking", "0").await;

    let mut tasks = JoinSet::new();
    for _ in 0..WRITERS {
        let engine = Arc::clone(&fx.engine);
        let (household, user) = (fx.household, fx.user);
        let income = input(TransactionKind::Income, "1.00", checking.id, None);
        tasks.spawn(async move { engine.create_transaction(household, user, &income).await });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    assert_eq!(fx.balance(checking.id).await, Decimal::from(WRITERS));
    let page = fx
        .engine
        .list_transactions(fx.household, &TransactionFilter::default(), 0, 0)
        .await
        .unwrap();
    assert_eq!(page.total, WRITERS as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_leave_legs_matching_the_stored_amount() {
    let fx = engine_with_file_db().await;
    let a = fx.account("A", "0").await;
    let b = fx.account("B", "0").await;
    let transfer = fx
        .engine
        .create_transaction(
            fx.household,
            fx.user,
            &input(TransactionKind::Transfer, "1.00", a.id, Some(b.id)),
        )
        .await
        .unwrap();

    let mut tasks = JoinSet::new();
    for i in 0..UPDATERS {
        let engine = Arc::clone(&fx.engine);
        let (id, household) = (transfer.id, fx.household);
        let amount = format!("{}.00", i % 5 + 1);
        let update = input(TransactionKind::Transfer, &amount, a.id, Some(b.id));
        tasks.spawn(async move { engine.update_transaction(id, household, &update).await });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    let stored = fx
        .engine
        .transaction(transfer.id, fx.household)
        .await
        .unwrap()
        .amount
        .value();
    assert!(stored >= dec!(1) && stored <= dec!(5));
    assert_eq!(fx.balance(a.id).await, -stored);
    assert_eq!(fx.balance(b.id).await, stored);
}

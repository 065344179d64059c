mod common;

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DbErr;
use uuid::Uuid;

use common::{day, engine_with_db, input};
use engine::{
    Amount, Engine, EngineError, TransactionFilter, TransactionKind, ledger, legs,
};

#[tokio::test]
async fn income_increases_balance() {
    let fx = engine_with_db().await;
    let checking = fx.account("Checking", "100.00").await;

    fx.engine
        .create_transaction(
            fx.household,
            fx.user,
            &input(TransactionKind::Income, "50.00", checking.id, None),
        )
        .await
        .unwrap();

    assert_eq!(fx.balance(checking.id).await, dec!(150));
}

#[tokio::test]
async fn deleting_an_expense_restores_balance() {
    let fx = engine_with_db().await;
    let checking = fx.account("Checking", "150.00").await;

    let tx = fx
        .engine
        .create_transaction(
            fx.household,
            fx.user,
            &input(TransactionKind::Expense, "30.00", checking.id, None),
        )
        .await
        .unwrap();
    assert_eq!(fx.balance(checking.id).await, dec!(120));

    fx.engine
        .delete_transaction(tx.id, fx.household)
        .await
        .unwrap();
    assert_eq!(fx.balance(checking.id).await, dec!(150));
    assert_eq!(
        fx.engine.transaction(tx.id, fx.household).await.unwrap_err(),
        EngineError::NotFound("transaction".to_string())
    );
}

#[tokio::test]
async fn updating_a_transfer_reverses_the_old_amount() {
    let fx = engine_with_db().await;
    let a = fx.account("A", "100.00").await;
    let b = fx.account("B", "0.00").await;

    let transfer = fx
        .engine
        .create_transaction(
            fx.household,
            fx.user,
            &input(TransactionKind::Transfer, "40.00", a.id, Some(b.id)),
        )
        .await
        .unwrap();
    assert_eq!(fx.balance(a.id).await, dec!(60));
    assert_eq!(fx.balance(b.id).await, dec!(40));

    fx.engine
        .update_transaction(
            transfer.id,
            fx.household,
            &input(TransactionKind::Transfer, "10.00", a.id, Some(b.id)),
        )
        .await
        .unwrap();
    assert_eq!(fx.balance(a.id).await, dec!(90));
    assert_eq!(fx.balance(b.id).await, dec!(10));
}

#[tokio::test]
async fn failed_update_keeps_record_and_balances() {
    let fx = engine_with_db().await;
    let a = fx.account("A", "100.00").await;
    let b = fx.account("B", "0.00").await;

    let transfer = fx
        .engine
        .create_transaction(
            fx.household,
            fx.user,
            &input(TransactionKind::Transfer, "40.00", a.id, Some(b.id)),
        )
        .await
        .unwrap();

    // The old deltas are reversed before the new destination is looked up.
    let err = fx
        .engine
        .update_transaction(
            transfer.id,
            fx.household,
            &input(TransactionKind::Transfer, "25.00", a.id, Some(Uuid::new_v4())),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("account".to_string()));

    assert_eq!(fx.balance(a.id).await, dec!(60));
    assert_eq!(fx.balance(b.id).await, dec!(40));
    let stored = fx
        .engine
        .transaction(transfer.id, fx.household)
        .await
        .unwrap();
    assert_eq!(stored.amount.value(), dec!(40));
    assert_eq!(stored.destination_account_id, Some(b.id));

    let err = fx
        .engine
        .update_transaction(
            Uuid::new_v4(),
            fx.household,
            &input(TransactionKind::Transfer, "25.00", a.id, Some(b.id)),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("transaction".to_string()));
    assert_eq!(fx.balance(a.id).await, dec!(60));
    assert_eq!(fx.balance(b.id).await, dec!(40));
}

#[tokio::test]
async fn transfer_without_destination_changes_nothing() {
    let fx = engine_with_db().await;
    let a = fx.account("A", "100.00").await;

    let err = fx
        .engine
        .create_transaction(
            fx.household,
            fx.user,
            &input(TransactionKind::Transfer, "40.00", a.id, None),
        )
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::TransferMissingDestination);
    assert_eq!(fx.balance(a.id).await, dec!(100));
    let page = fx
        .engine
        .list_transactions(fx.household, &TransactionFilter::default(), 0, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn update_can_change_kind_and_accounts() {
    let fx = engine_with_db().await;
    let a = fx.account("A", "100").await;
    let b = fx.account("B", "100").await;

    let tx = fx
        .engine
        .create_transaction(
            fx.household,
            fx.user,
            &input(TransactionKind::Expense, "25", a.id, None),
        )
        .await
        .unwrap();
    assert_eq!(fx.balance(a.id).await, dec!(75));

    let updated = fx
        .engine
        .update_transaction(
            tx.id,
            fx.household,
            &input(TransactionKind::Transfer, "5.5", b.id, Some(a.id)),
        )
        .await
        .unwrap();
    assert_eq!(updated.kind, TransactionKind::Transfer);
    assert_eq!(updated.created_at, tx.created_at);
    assert_eq!(fx.balance(a.id).await, dec!(105.5));
    assert_eq!(fx.balance(b.id).await, dec!(94.5));

    fx.engine
        .update_transaction(
            tx.id,
            fx.household,
            &input(TransactionKind::Income, "1", b.id, None),
        )
        .await
        .unwrap();
    assert_eq!(fx.balance(a.id).await, dec!(100));
    assert_eq!(fx.balance(b.id).await, dec!(101));
}

#[tokio::test]
async fn identical_update_leaves_balances_unchanged() {
    let fx = engine_with_db().await;
    let a = fx.account("A", "10.01").await;
    let b = fx.account("B", "-3").await;
    let same = input(TransactionKind::Transfer, "7.3333", a.id, Some(b.id));

    let tx = fx
        .engine
        .create_transaction(fx.household, fx.user, &same)
        .await
        .unwrap();
    let (before_a, before_b) = (fx.balance(a.id).await, fx.balance(b.id).await);

    fx.engine
        .update_transaction(tx.id, fx.household, &same)
        .await
        .unwrap();

    assert_eq!(fx.balance(a.id).await, before_a);
    assert_eq!(fx.balance(b.id).await, before_b);
}

#[tokio::test]
async fn create_then_delete_round_trips_exactly() {
    let fx = engine_with_db().await;
    let a = fx.account("A", "0.1").await;
    let b = fx.account("B", "0.2").await;

    for (kind, dest) in [
        (TransactionKind::Income, None),
        (TransactionKind::Expense, None),
        (TransactionKind::Transfer, Some(b.id)),
    ] {
        let tx = fx
            .engine
            .create_transaction(fx.household, fx.user, &input(kind, "0.0001", a.id, dest))
            .await
            .unwrap();
        fx.engine
            .delete_transaction(tx.id, fx.household)
            .await
            .unwrap();
        assert_eq!(fx.balance(a.id).await, dec!(0.1));
        assert_eq!(fx.balance(b.id).await, dec!(0.2));
    }
}

#[tokio::test]
async fn balances_equal_opening_plus_live_deltas() {
    let fx = engine_with_db().await;
    let accounts = [
        fx.account("Card", "100").await,
        fx.account("Cash", "20.5").await,
        fx.account("Deposit", "0").await,
    ];
    let openings: Vec<Decimal> = accounts.iter().map(|a| a.balance.value()).collect();
    let [card, cash, deposit] = [accounts[0].id, accounts[1].id, accounts[2].id];

    let mut created = Vec::new();
    for draft in [
        input(TransactionKind::Income, "1000", card, None),
        input(TransactionKind::Expense, "12.34", cash, None),
        input(TransactionKind::Transfer, "250", card, Some(deposit)),
        input(TransactionKind::Transfer, "5", deposit, Some(cash)),
        input(TransactionKind::Expense, "99.99", card, None),
    ] {
        let tx = fx
            .engine
            .create_transaction(fx.household, fx.user, &draft)
            .await
            .unwrap();
        created.push(tx.id);
    }
    fx.engine
        .update_transaction(
            created[1],
            fx.household,
            &input(TransactionKind::Income, "3", deposit, None),
        )
        .await
        .unwrap();
    fx.engine
        .delete_transaction(created[3], fx.household)
        .await
        .unwrap();

    let live = fx
        .engine
        .list_transactions(fx.household, &TransactionFilter::default(), 500, 0)
        .await
        .unwrap()
        .data;
    for (account, opening) in accounts.iter().zip(openings) {
        let expected = live
            .iter()
            .flat_map(|tx| legs::legs_of(tx).unwrap())
            .filter(|leg| leg.account_id == account.id)
            .fold(opening, |acc, leg| acc + leg.delta.value());
        assert_eq!(fx.balance(account.id).await, expected, "{}", account.name);
    }
}

#[tokio::test]
async fn failure_between_transfer_legs_rolls_back_everything() {
    let fx = engine_with_db().await;
    let a = fx.account("A", "100").await;
    let b = fx.account("B", "0").await;
    let draft =
        ledger::validate(&input(TransactionKind::Transfer, "40", a.id, Some(b.id))).unwrap();
    let (household, user) = (fx.household, fx.user);

    let err = fx
        .engine
        .atomically(move |stores| {
            Box::pin(async move {
                let tx = stores.transactions.create(household, user, &draft).await?;
                let legs = legs::legs_of(&tx)?;
                stores
                    .accounts
                    .apply_delta(legs[0].account_id, legs[0].delta)
                    .await?;
                Err::<(), _>(EngineError::Database(DbErr::Custom("injected".to_string())))
            })
        })
        .await
        .unwrap_err();

    assert!(!err.is_validation());
    assert_eq!(fx.balance(a.id).await, dec!(100));
    assert_eq!(fx.balance(b.id).await, dec!(0));
    let page = fx
        .engine
        .list_transactions(fx.household, &TransactionFilter::default(), 0, 0)
        .await
        .unwrap();
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn missing_second_leg_account_rolls_back_first_leg() {
    let fx = engine_with_db().await;
    let a = fx.account("A", "100").await;
    let ghost = Uuid::new_v4();
    let amount: Amount = "40".parse().unwrap();

    let err = fx
        .engine
        .atomically(move |stores| {
            Box::pin(async move {
                stores.accounts.apply_delta(a.id, -amount).await?;
                stores.accounts.apply_delta(ghost, amount).await
            })
        })
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::NotFound("account".to_string()));
    assert_eq!(fx.balance(a.id).await, dec!(100));
}

#[tokio::test]
async fn unit_of_work_sees_its_own_deltas() {
    let fx = engine_with_db().await;
    let a = fx.account("A", "1").await;
    let household = fx.household;

    let seen = fx
        .engine
        .atomically(move |stores| {
            Box::pin(async move {
                let step: Amount = "2.5".parse()?;
                stores.accounts.apply_delta(a.id, step).await?;
                stores.accounts.apply_delta(a.id, step).await?;
                Ok(stores.accounts.get(a.id, household).await?.balance)
            })
        })
        .await
        .unwrap();

    assert_eq!(seen.value(), dec!(6));
    assert_eq!(fx.balance(a.id).await, dec!(6));
}

#[tokio::test]
async fn slow_unit_of_work_times_out_and_rolls_back() {
    let fx = engine_with_db().await;
    let a = fx.account("A", "100").await;
    let engine = Engine::builder()
        .database(fx.db.clone())
        .operation_timeout(Duration::from_millis(20))
        .build()
        .await
        .unwrap();

    let err = engine
        .atomically(move |stores| {
            Box::pin(async move {
                stores
                    .accounts
                    .apply_delta(a.id, "-50".parse()?)
                    .await?;
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok(())
            })
        })
        .await
        .unwrap_err();

    assert_eq!(err, EngineError::Timeout(20));
    assert_eq!(fx.balance(a.id).await, dec!(100));
}

#[tokio::test]
async fn rejected_inputs_never_touch_balances() {
    let fx = engine_with_db().await;
    let a = fx.account("A", "100").await;
    let b = fx.account("B", "100").await;

    let cases = [
        input(TransactionKind::Expense, "0", a.id, None),
        input(TransactionKind::Expense, "-5", a.id, None),
        input(TransactionKind::Expense, "1.23456", a.id, None),
        input(TransactionKind::Income, "5", a.id, Some(b.id)),
        input(TransactionKind::Transfer, "5", a.id, Some(a.id)),
        input(TransactionKind::Transfer, "5", a.id, Some(Uuid::new_v4())),
    ];
    for case in &cases {
        let err = fx
            .engine
            .create_transaction(fx.household, fx.user, case)
            .await
            .unwrap_err();
        assert!(err.is_validation(), "{err}");
    }
    assert_eq!(fx.balance(a.id).await, dec!(100));
    assert_eq!(fx.balance(b.id).await, dec!(100));
}

#[tokio::test]
async fn other_households_cannot_see_or_touch_records() {
    let fx = engine_with_db().await;
    let a = fx.account("A", "100").await;
    let tx = fx
        .engine
        .create_transaction(
            fx.household,
            fx.user,
            &input(TransactionKind::Expense, "10", a.id, None),
        )
        .await
        .unwrap();

    let bob = fx.engine.new_user("bob@example.com", "Bob").await.unwrap();
    let other = fx.engine.new_household("Other", bob.id).await.unwrap();

    let not_found = EngineError::NotFound("transaction".to_string());
    assert_eq!(
        fx.engine.transaction(tx.id, other.id).await.unwrap_err(),
        not_found
    );
    assert_eq!(
        fx.engine
            .delete_transaction(tx.id, other.id)
            .await
            .unwrap_err(),
        not_found
    );
    assert_eq!(
        fx.engine
            .create_transaction(
                other.id,
                bob.id,
                &input(TransactionKind::Income, "1", a.id, None)
            )
            .await
            .unwrap_err(),
        EngineError::NotFound("account".to_string())
    );
    assert_eq!(fx.balance(a.id).await, dec!(90));
}

#[tokio::test]
async fn listing_filters_and_pages() {
    let fx = engine_with_db().await;
    let a = fx.account("A", "0").await;
    let b = fx.account("B", "0").await;

    for (d, kind, src, dest) in [
        (1, TransactionKind::Income, a.id, None),
        (2, TransactionKind::Expense, a.id, None),
        (3, TransactionKind::Transfer, b.id, Some(a.id)),
        (4, TransactionKind::Income, b.id, None),
    ] {
        let mut raw = input(kind, "1", src, dest);
        raw.transacted_at = day(d);
        fx.engine
            .create_transaction(fx.household, fx.user, &raw)
            .await
            .unwrap();
    }

    let all = fx
        .engine
        .list_transactions(fx.household, &TransactionFilter::default(), 0, 0)
        .await
        .unwrap();
    assert_eq!(all.total, 4);
    assert_eq!(all.limit, engine::DEFAULT_PAGE_LIMIT);
    let dates: Vec<_> = all.data.iter().map(|tx| tx.transacted_at).collect();
    assert_eq!(dates, vec![day(4), day(3), day(2), day(1)]);

    let touching_a = TransactionFilter {
        account_id: Some(a.id),
        ..TransactionFilter::default()
    };
    let page = fx
        .engine
        .list_transactions(fx.household, &touching_a, 0, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 3);

    let window = TransactionFilter {
        from: Some(day(2)),
        to: Some(day(3)),
        ..TransactionFilter::default()
    };
    let page = fx
        .engine
        .list_transactions(fx.household, &window, 0, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 2);

    let incomes = TransactionFilter {
        kind: Some(TransactionKind::Income),
        ..TransactionFilter::default()
    };
    let page = fx
        .engine
        .list_transactions(fx.household, &incomes, 1, 1)
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].transacted_at, day(1));
}

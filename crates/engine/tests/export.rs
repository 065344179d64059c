mod common;

use common::{day, engine_with_db, input};
use engine::TransactionKind;

#[tokio::test]
async fn csv_has_header_and_one_row_per_leg() {
    let fx = engine_with_db().await;
    let card = fx.account("Card", "100").await;
    let cash = fx.account("Cash", "0").await;

    let mut salary = input(TransactionKind::Income, "1500", card.id, None);
    salary.description = "Salary".to_string();
    salary.transacted_at = day(1);
    let mut coffee = input(TransactionKind::Expense, "3.456", cash.id, None);
    coffee.description = "Coffee, large".to_string();
    coffee.tags = vec!["food".to_string(), "daily".to_string()];
    coffee.transacted_at = day(3);
    let mut atm = input(TransactionKind::Transfer, "40", card.id, Some(cash.id));
    atm.description = "ATM".to_string();
    atm.transacted_at = day(2);
    for raw in [&salary, &coffee, &atm] {
        fx.engine
            .create_transaction(fx.household, fx.user, raw)
            .await
            .unwrap();
    }

    let mut out = Vec::new();
    let rows = fx
        .engine
        .export_csv(fx.household, None, None, &mut out)
        .await
        .unwrap();
    assert_eq!(rows, 4);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Date,Description,Amount,Account,Tags,Type,Status,Currency",
            "2024-05-03,\"Coffee, large\",-3.46,Cash,\"food, daily\",expense,cleared,USD",
            "2024-05-02,ATM,-40.00,Card,,transfer,cleared,USD",
            "2024-05-02,ATM,40.00,Cash,,transfer,cleared,USD",
            "2024-05-01,Salary,1500.00,Card,,income,cleared,USD",
        ]
    );
}

#[tokio::test]
async fn csv_respects_the_date_window() {
    let fx = engine_with_db().await;
    let card = fx.account("Card", "0").await;
    for d in [1, 2, 3] {
        let mut raw = input(TransactionKind::Income, "1", card.id, None);
        raw.transacted_at = day(d);
        fx.engine
            .create_transaction(fx.household, fx.user, &raw)
            .await
            .unwrap();
    }

    let mut out = Vec::new();
    let rows = fx
        .engine
        .export_csv(fx.household, Some(day(2)), Some(day(2)), &mut out)
        .await
        .unwrap();
    assert_eq!(rows, 1);
    assert!(String::from_utf8(out).unwrap().contains("2024-05-02"));
}

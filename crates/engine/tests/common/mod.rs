#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{Account, Engine, NewAccountInput, TransactionInput, TransactionKind};
use migration::MigratorTrait;

pub struct Fixture {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
    pub user: Uuid,
    pub household: Uuid,
    file: Option<PathBuf>,
}

impl Drop for Fixture {
    fn drop(&mut self) {
        if let Some(path) = &self.file {
            let _ = std::fs::remove_file(path);
        }
    }
}

pub async fn engine_with_db() -> Fixture {
    fixture("sqlite::memory:".to_string(), None).await
}

/// Same as [`engine_with_db`] but backed by a temporary SQLite file, so
/// several pooled connections see the same data.
pub async fn engine_with_file_db() -> Fixture {
    let path = std::env::temp_dir().join(format!("homeledger-{}.db", Uuid::new_v4()));
    fixture(format!("sqlite:{}?mode=rwc", path.display()), Some(path)).await
}

async fn fixture(url: String, file: Option<PathBuf>) -> Fixture {
    let db = Database::connect(url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let user = engine.new_user("alice@example.com", "Alice").await.unwrap();
    let household = engine.new_household("Home", user.id).await.unwrap();
    Fixture {
        engine: Arc::new(engine),
        db,
        user: user.id,
        household: household.id,
        file,
    }
}

impl Fixture {
    pub async fn account(&self, name: &str, balance: &str) -> Account {
        self.engine
            .create_account(
                self.household,
                self.user,
                NewAccountInput {
                    name: name.to_string(),
                    kind: "card".to_string(),
                    balance: balance.to_string(),
                    currency: Some("USD".to_string()),
                },
            )
            .await
            .unwrap()
    }

    pub async fn balance(&self, account_id: Uuid) -> Decimal {
        self.engine
            .account(account_id, self.household)
            .await
            .unwrap()
            .balance
            .value()
    }
}

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, d, 12, 0, 0).unwrap()
}

pub fn input(
    kind: TransactionKind,
    amount: &str,
    account_id: Uuid,
    destination_account_id: Option<Uuid>,
) -> TransactionInput {
    TransactionInput {
        kind,
        description: format!("{} {amount}", kind.as_str()),
        amount: amount.to_string(),
        account_id,
        destination_account_id,
        tags: Vec::new(),
        note: None,
        transacted_at: day(1),
    }
}

use std::{future::Future, pin::Pin, time::Duration};

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::{EngineError, ResultEngine, store::Stores};

mod accounts;
mod export;
mod households;
mod transactions;

pub use accounts::NewAccountInput;
pub use export::{EXPORT_HEADER, ExportRow, export_rows};
pub use transactions::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, Page};

/// Default bound on the duration of one unit of work.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Future returned by a unit of work body.
pub type BoxFuture<'c, T> = Pin<Box<dyn Future<Output = T> + Send + 'c>>;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    operation_timeout: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Stores bound to the pool, for reads outside any unit of work.
    pub fn stores(&self) -> Stores<'_, DatabaseConnection> {
        Stores::new(&self.database)
    }

    /// Runs `f` as one unit of work.
    ///
    /// `f` receives stores bound to a fresh database transaction. The
    /// transaction is committed only if `f` returns `Ok`; on error, or when
    /// the operation window elapses, it is dropped uncommitted and every
    /// change made through the stores is rolled back.
    ///
    /// ```rust,ignore
    /// engine
    ///     .atomically(move |stores| {
    ///         Box::pin(async move { ledger::delete_transaction(stores, id, household_id).await })
    ///     })
    ///     .await?;
    /// ```
    pub async fn atomically<F, T>(&self, f: F) -> ResultEngine<T>
    where
        F: for<'c> FnOnce(Stores<'c, DatabaseTransaction>) -> BoxFuture<'c, ResultEngine<T>>
            + Send,
        T: Send,
    {
        let work = async {
            let db_tx = self.database.begin().await?;
            let value = f(Stores::new(&db_tx)).await?;
            db_tx.commit().await?;
            Ok(value)
        };
        match tokio::time::timeout(self.operation_timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                let millis = u64::try_from(self.operation_timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::error!(timeout_ms = millis, "unit of work timed out, rolled back");
                Err(EngineError::Timeout(millis))
            }
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    operation_timeout: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Bound every unit of work (default: [`DEFAULT_OPERATION_TIMEOUT`]).
    pub fn operation_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let operation_timeout = self.operation_timeout.unwrap_or(DEFAULT_OPERATION_TIMEOUT);
        if operation_timeout.is_zero() {
            return Err(EngineError::InvalidField(
                "operation timeout must be greater than zero".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            operation_timeout,
        })
    }
}

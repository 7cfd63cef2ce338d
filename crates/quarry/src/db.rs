mod builder;
pub use builder::Builder;

use crate::{query::QueryBuilder, Model};

use quarry_core::{
    driver::{
        operation::{SchemaOp, Transaction as TxBoundary},
        Driver,
    },
    schema::TableDef,
    stmt, Error, Result,
};

use std::{collections::HashMap, future::Future, sync::Arc};

/// A configured database handle: one adapter per named connection plus a
/// default connection name.
///
/// `Db` is cheap to clone; every clone shares the same adapters.
#[derive(Debug, Clone)]
pub struct Db {
    connections: Arc<HashMap<String, Arc<dyn Driver>>>,
    default: String,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// The adapter registered under `name`.
    pub fn driver(&self, name: &str) -> Result<Arc<dyn Driver>> {
        match self.connections.get(name) {
            Some(driver) => Ok(driver.clone()),
            None => Err(quarry_core::err!("unknown connection `{name}`")),
        }
    }

    pub fn default_connection(&self) -> &str {
        &self.default
    }

    /// Start building a query against `table` on the default connection.
    pub fn query(&self, table: impl Into<String>) -> QueryBuilder {
        // The builder guarantees the default connection exists.
        let driver = self.connections[&self.default].clone();
        QueryBuilder::new(driver, table, None)
    }

    /// Start building a query against `table` on a named connection.
    pub fn query_on(&self, connection: &str, table: impl Into<String>) -> Result<QueryBuilder> {
        let driver = self.driver(connection)?;
        Ok(QueryBuilder::new(driver, table, None))
    }

    /// Start building a query for a model type on the default connection.
    pub fn query_builder<M: Model>(&self) -> QueryBuilder {
        let driver = self.connections[&self.default].clone();
        QueryBuilder::new(driver, M::TABLE, M::PRIMARY_KEY)
    }

    /// Create a table (or collection) on the default connection. Idempotent.
    pub async fn create_table(&self, def: TableDef) -> Result<()> {
        let driver = self.connections[&self.default].clone();
        driver.exec(SchemaOp::CreateTable(def).into()).await?;
        Ok(())
    }

    pub async fn drop_table(&self, name: impl Into<String>) -> Result<()> {
        let driver = self.connections[&self.default].clone();
        driver.exec(SchemaOp::DropTable(name.into()).into()).await?;
        Ok(())
    }

    pub async fn table_exists(&self, name: impl Into<String>) -> Result<bool> {
        let driver = self.connections[&self.default].clone();
        let value = driver
            .exec(SchemaOp::TableExists(name.into()).into())
            .await?
            .into_aggregate()?;
        Ok(value == stmt::Value::Bool(true))
    }

    /// Runs `f` inside a transaction on the default connection.
    ///
    /// On a backend advertising transactions this issues `BEGIN`, runs the
    /// callback, and commits; a callback error triggers `ROLLBACK` and is
    /// resurfaced wrapped as a transaction error with the original as its
    /// cause. On a backend without multi-statement transactions the
    /// callback runs as a plain non-transactional sequence.
    pub async fn transaction<F, Fut, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(Db) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let connection = self.default.clone();
        self.transaction_on(&connection, f).await
    }

    /// Runs `f` inside a transaction on a named connection.
    pub async fn transaction_on<F, Fut, T>(&self, connection: &str, f: F) -> Result<T>
    where
        F: FnOnce(Db) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let driver = self.driver(connection)?;
        let db = self.clone();
        execute_transactional(&driver, connection, move || f(db)).await
    }
}

/// Shared transaction flow for the `Db` and builder entry points: `BEGIN`,
/// run the callback, `COMMIT` on success; `ROLLBACK` and resurface the
/// callback's error wrapped as the transaction kind on failure. Backends
/// without multi-statement transactions run the callback as-is.
pub(crate) async fn execute_transactional<F, Fut, T>(
    driver: &Arc<dyn Driver>,
    scope: &str,
    f: F,
) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if !driver.capability().transactions {
        tracing::debug!(
            target: "quarry::db",
            scope,
            "backend does not support transactions; executing without one"
        );
        return f().await;
    }

    driver.exec(TxBoundary::Start.into()).await?;

    match f().await {
        Ok(value) => {
            driver.exec(TxBoundary::Commit.into()).await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = driver.exec(TxBoundary::Rollback.into()).await {
                tracing::error!(
                    target: "quarry::db",
                    scope,
                    %rollback_err,
                    "rollback failed"
                );
            }
            Err(err.context(Error::transaction(format!(
                "callback failed; scope={scope}"
            ))))
        }
    }
}

mod value;
pub(crate) use value::Value;

use quarry_core::{
    async_trait,
    driver::{
        operation::{Operation, RawQuery, SchemaOp, Transaction},
        Capability, Driver, Response,
    },
    stmt, Error, Result,
};
use quarry_sql::Serializer;

use rusqlite::Connection;
use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};
use url::Url;

/// Relational adapter backed by SQLite.
///
/// Owns exactly one underlying connection; lifecycle is
/// `unconnected → connected` and [`Driver::connect`] is idempotent.
#[derive(Debug)]
pub struct Sqlite {
    target: Target,
    connection: Mutex<Option<Connection>>,
    connected: AtomicBool,
}

#[derive(Debug)]
enum Target {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite adapter from a connection URL.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::adapter)?;

        if url.scheme() != "sqlite" {
            return Err(quarry_core::err!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            ));
        }

        if url.path() == ":memory:" {
            Ok(Self::in_memory())
        } else {
            Ok(Self::open(url.path()))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::from_target(Target::InMemory)
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::from_target(Target::File(path.as_ref().to_path_buf()))
    }

    fn from_target(target: Target) -> Self {
        Self {
            target,
            connection: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    /// Runs `f` with the live connection, establishing it first if needed.
    fn with_connection<R>(&self, f: impl FnOnce(&Connection) -> Result<R>) -> Result<R> {
        let mut guard = self
            .connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if guard.is_none() {
            let connection = match &self.target {
                Target::File(path) => Connection::open(path).map_err(Error::adapter)?,
                Target::InMemory => Connection::open_in_memory().map_err(Error::adapter)?,
            };
            *guard = Some(connection);
            self.connected.store(true, Ordering::Release);
        }

        f(guard.as_ref().expect("connection was just established"))
    }

    fn exec_query(&self, connection: &Connection, query: stmt::Query) -> Result<Response> {
        let serializer = Serializer::sqlite();
        let aggregate = query.is_aggregate();

        let mut params: Vec<stmt::Value> = Vec::new();
        let sql = serializer.serialize_query(&query, &mut params)?;

        if aggregate {
            let value = query_scalar(connection, &sql, &params)?;
            return Ok(Response::aggregate(value));
        }

        let values = query_records(connection, &sql, &params)?;
        Ok(Response::values(values))
    }
}

#[async_trait]
impl Driver for Sqlite {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    async fn connect(&self) -> Result<()> {
        // No-op when already connected.
        self.with_connection(|_| Ok(()))
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn exec(&self, op: Operation) -> Result<Response> {
        self.with_connection(|connection| {
            let serializer = Serializer::sqlite();

            match op {
                Operation::Query(query) => self.exec_query(connection, query),
                Operation::Insert(op) => {
                    // One statement per row: rows may carry different field
                    // sets, and each statement gets its own parameter window.
                    let mut inserted = Vec::with_capacity(op.rows.len());
                    for row in &op.rows {
                        let mut params: Vec<stmt::Value> = Vec::new();
                        let sql = serializer.serialize_insert_row(&op.table, row, &mut params)?;
                        inserted.extend(query_records(connection, &sql, &params)?);
                    }
                    Ok(Response::values(inserted))
                }
                Operation::Update(op) => {
                    let mut params: Vec<stmt::Value> = Vec::new();
                    let sql = serializer.serialize_update(&op, &mut params)?;
                    let updated = query_records(connection, &sql, &params)?;
                    Ok(Response::values(updated))
                }
                Operation::Delete(op) => {
                    let mut params: Vec<stmt::Value> = Vec::new();
                    let sql = serializer.serialize_delete(&op.query, &mut params)?;
                    let count = execute(connection, &sql, &params)?;
                    Ok(Response::count(count))
                }
                Operation::Raw(RawQuery { raw, .. }) => match raw {
                    stmt::Raw::Sql { sql, bindings } => {
                        let mut stmt = connection.prepare(&sql).map_err(Error::adapter)?;
                        if stmt.column_count() == 0 {
                            drop(stmt);
                            let count = execute(connection, &sql, &bindings)?;
                            Ok(Response::count(count))
                        } else {
                            drop(stmt);
                            let values = query_records(connection, &sql, &bindings)?;
                            Ok(Response::values(values))
                        }
                    }
                    stmt::Raw::Pipeline(_) => Err(Error::expression(
                        "aggregation pipelines cannot run on a relational backend",
                    )),
                },
                Operation::Transaction(op) => {
                    connection
                        .execute_batch(serializer.serialize_transaction(op))
                        .map_err(Error::adapter)?;
                    Ok(Response::count(0))
                }
                Operation::Schema(op) => match op {
                    SchemaOp::CreateTable(def) => {
                        let sql = serializer.serialize_create_table(&def);
                        connection.execute_batch(&sql).map_err(Error::adapter)?;
                        Ok(Response::count(0))
                    }
                    SchemaOp::DropTable(name) => {
                        let sql = serializer.serialize_drop_table(&name);
                        connection.execute_batch(&sql).map_err(Error::adapter)?;
                        Ok(Response::count(0))
                    }
                    SchemaOp::TableExists(name) => {
                        let mut params: Vec<stmt::Value> = Vec::new();
                        let sql = serializer.serialize_table_exists(&name, &mut params);
                        let records = query_records(connection, &sql, &params)?;
                        Ok(Response::aggregate(stmt::Value::Bool(!records.is_empty())))
                    }
                },
            }
        })
        .inspect_err(|err| {
            tracing::error!(target: "quarry::sqlite", %err, "operation failed");
        })
    }
}

fn bind_params(params: &[stmt::Value]) -> Vec<Value> {
    params.iter().cloned().map(Value::from).collect()
}

fn execute(connection: &Connection, sql: &str, params: &[stmt::Value]) -> Result<u64> {
    let mut stmt = connection.prepare_cached(sql).map_err(Error::adapter)?;
    let count = stmt
        .execute(rusqlite::params_from_iter(bind_params(params)))
        .map_err(Error::adapter)?;
    Ok(count as u64)
}

fn query_records(
    connection: &Connection,
    sql: &str,
    params: &[stmt::Value],
) -> Result<Vec<stmt::Record>> {
    let mut stmt = connection.prepare_cached(sql).map_err(Error::adapter)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut rows = stmt
        .query(rusqlite::params_from_iter(bind_params(params)))
        .map_err(Error::adapter)?;

    let mut records = Vec::new();
    while let Some(row) = rows.next().map_err(Error::adapter)? {
        let mut record = stmt::Record::new();
        for (index, column) in columns.iter().enumerate() {
            let value = value::from_sql(row.get_ref(index).map_err(Error::adapter)?)?;
            record.insert(column.clone(), value);
        }
        records.push(record);
    }

    Ok(records)
}

fn query_scalar(connection: &Connection, sql: &str, params: &[stmt::Value]) -> Result<stmt::Value> {
    let mut stmt = connection.prepare_cached(sql).map_err(Error::adapter)?;
    let mut rows = stmt
        .query(rusqlite::params_from_iter(bind_params(params)))
        .map_err(Error::adapter)?;

    match rows.next().map_err(Error::adapter)? {
        Some(row) => value::from_sql(row.get_ref(0).map_err(Error::adapter)?),
        None => Ok(stmt::Value::Null),
    }
}

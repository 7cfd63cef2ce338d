#[macro_use]
mod fmt;
use fmt::{Comma, ToSql};

mod flavor;
use flavor::Flavor;

mod ident;
use ident::Ident;

mod params;
pub use params::{Params, Placeholder};

// Fragment serializers
mod expr;
mod statement;

use statement::{DeleteStmt, InsertStmt, SelectStmt, UpdateStmt};

use quarry_core::{
    driver::operation::{Transaction, Update},
    schema::{ColumnType, TableDef},
    stmt, Error, Result,
};

/// Compiles query expressions and write operations into parameterized SQL.
///
/// Values are never interpolated into the statement text; every value
/// becomes a bound parameter pushed onto `params` in placeholder order.
/// Identifiers come from application schema metadata, not arbitrary user
/// input, but are still quoted defensively.
#[derive(Debug)]
pub struct Serializer {
    /// The database flavor handles dialect differences. Only SQLite is
    /// exercised today.
    flavor: Flavor,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

impl Serializer {
    pub fn sqlite() -> Self {
        Self {
            flavor: Flavor::Sqlite,
        }
    }

    /// Serialize a read (SELECT) described by the query expression.
    pub fn serialize_query(&self, query: &stmt::Query, params: &mut impl Params) -> Result<String> {
        self.validate(query)?;
        Ok(self.render(SelectStmt(query), params))
    }

    /// Serialize an INSERT for a single row, returning the inserted record.
    ///
    /// Rows may carry different field sets, so multi-row inserts serialize
    /// one statement per row, each with its own parameter window.
    pub fn serialize_insert_row(
        &self,
        table: &str,
        row: &stmt::Record,
        params: &mut impl Params,
    ) -> Result<String> {
        if row.is_empty() {
            return Err(Error::expression("cannot insert an empty record"));
        }
        Ok(self.render(InsertStmt { table, row }, params))
    }

    /// Serialize an UPDATE applying the assignment set to every matched
    /// row, returning the updated records.
    pub fn serialize_update(&self, op: &Update, params: &mut impl Params) -> Result<String> {
        if op.assignments.is_empty() {
            return Err(Error::expression("update requires at least one assignment"));
        }
        self.validate(&op.query)?;
        Ok(self.render(
            UpdateStmt {
                query: &op.query,
                assignments: &op.assignments,
            },
            params,
        ))
    }

    /// Serialize a DELETE for every matched row.
    pub fn serialize_delete(&self, query: &stmt::Query, params: &mut impl Params) -> Result<String> {
        self.validate(query)?;
        Ok(self.render(DeleteStmt(query), params))
    }

    /// Serialize a transaction control operation.
    pub fn serialize_transaction(&self, op: Transaction) -> &'static str {
        match op {
            Transaction::Start => "BEGIN",
            Transaction::Commit => "COMMIT",
            Transaction::Rollback => "ROLLBACK",
        }
    }

    pub fn serialize_create_table(&self, def: &TableDef) -> String {
        let mut sql = String::new();
        let mut params = Vec::new();
        let mut f = Formatter {
            serializer: self,
            dst: &mut sql,
            params: &mut params,
        };

        fmt!(&mut f, "CREATE TABLE IF NOT EXISTS " Ident(&def.name) " (");
        let mut s = "";
        for column in &def.columns {
            fmt!(&mut f, s "\n    " Ident(&column.name) " " column_type_sql(column.ty));
            if column.primary_key {
                fmt!(&mut f, " PRIMARY KEY");
            }
            s = ",";
        }
        fmt!(&mut f, "\n)");

        debug_assert!(params.is_empty());
        sql
    }

    pub fn serialize_drop_table(&self, name: &str) -> String {
        let mut sql = String::new();
        let mut params = Vec::new();
        let mut f = Formatter {
            serializer: self,
            dst: &mut sql,
            params: &mut params,
        };
        fmt!(&mut f, "DROP TABLE IF EXISTS " Ident(name));
        sql
    }

    pub fn serialize_table_exists(&self, name: &str, params: &mut impl Params) -> String {
        let placeholder = params.push(&stmt::Value::String(name.to_string()));
        let mut sql = String::from("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ");
        let mut f = Formatter {
            serializer: self,
            dst: &mut sql,
            params,
        };
        placeholder.to_sql(&mut f);
        sql
    }

    fn render<S: ToSql>(&self, stmt: S, params: &mut impl Params) -> String {
        let mut ret = String::new();

        let mut f = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut f);
        ret
    }

    /// Rejects expression states that have no consistent SQL rendering.
    /// These are programmer-misuse errors; they are never retried.
    fn validate(&self, query: &stmt::Query) -> Result<()> {
        if query.offset.is_some() && query.limit.is_none() {
            return Err(Error::expression("offset requires a limit"));
        }

        for clause in &query.filter {
            if clause.value.is_null() && !matches!(clause.op, stmt::Op::Eq | stmt::Op::Ne) {
                return Err(Error::expression(format!(
                    "cannot compare `{}` against NULL with {:?}",
                    clause.field, clause.op
                )));
            }
        }

        if let Some(aggregate) = &query.aggregate {
            if aggregate.field.is_none() && aggregate.func != stmt::AggregateFunc::Count {
                return Err(Error::expression(format!(
                    "{:?} aggregate requires a field",
                    aggregate.func
                )));
            }
        }

        Ok(())
    }
}

fn column_type_sql(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Id | ColumnType::Text => "TEXT",
        ColumnType::Integer | ColumnType::Bool => "INTEGER",
        ColumnType::Real => "REAL",
    }
}

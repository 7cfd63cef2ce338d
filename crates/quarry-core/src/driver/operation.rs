mod delete;
pub use delete::Delete;

mod insert;
pub use insert::Insert;

mod raw;
pub use raw::RawQuery;

mod schema;
pub use schema::SchemaOp;

mod transaction;
pub use transaction::Transaction;

mod update;
pub use update::Update;

use crate::stmt;

/// A database operation handed to a driver for execution.
#[derive(Debug)]
pub enum Operation {
    /// Read rows/documents (or an aggregate) described by a query
    /// expression.
    Query(stmt::Query),

    Insert(Insert),

    Update(Update),

    Delete(Delete),

    /// Backend-native escape hatch.
    Raw(RawQuery),

    /// Transaction boundary control.
    Transaction(Transaction),

    /// Minimal DDL surface (sibling capability; see schema module).
    Schema(SchemaOp),
}

impl From<stmt::Query> for Operation {
    fn from(query: stmt::Query) -> Self {
        Self::Query(query)
    }
}

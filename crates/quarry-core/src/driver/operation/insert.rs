use crate::stmt;

use super::Operation;

/// Insert one or more records into a table/collection, returning the
/// inserted records.
#[derive(Debug)]
pub struct Insert {
    pub table: String,

    /// The primary-key column/field name for the target table.
    pub primary_key: String,

    pub rows: Vec<stmt::Record>,
}

impl From<Insert> for Operation {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}

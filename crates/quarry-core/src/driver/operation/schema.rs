use crate::schema::TableDef;

use super::Operation;

/// Minimal DDL surface living on the same adapter as the query capability.
///
/// Full schema management (migrations, alters, databases) is a sibling
/// concern and out of scope here.
#[derive(Debug)]
pub enum SchemaOp {
    CreateTable(TableDef),
    DropTable(String),
    TableExists(String),
}

impl From<SchemaOp> for Operation {
    fn from(value: SchemaOp) -> Self {
        Self::Schema(value)
    }
}

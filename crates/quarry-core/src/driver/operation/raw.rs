use crate::stmt;

use super::Operation;

/// A backend-native query submitted through the escape hatch.
#[derive(Debug)]
pub struct RawQuery {
    /// The target collection, required by the document backend to run a
    /// pipeline. Ignored by the relational backend (the statement names
    /// its own tables).
    pub table: Option<String>,

    pub raw: stmt::Raw,
}

impl From<RawQuery> for Operation {
    fn from(value: RawQuery) -> Self {
        Self::Raw(value)
    }
}

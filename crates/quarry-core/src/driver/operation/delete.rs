use crate::stmt;

use super::Operation;

/// Delete every record matched by the query, returning the deleted count.
#[derive(Debug)]
pub struct Delete {
    pub query: stmt::Query,
}

impl From<Delete> for Operation {
    fn from(value: Delete) -> Self {
        Self::Delete(value)
    }
}

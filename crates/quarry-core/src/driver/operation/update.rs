use crate::stmt;

use super::Operation;

/// Apply a partial attribute merge to every record matched by the query.
///
/// The response carries the updated records themselves, not a count.
#[derive(Debug)]
pub struct Update {
    pub query: stmt::Query,

    pub assignments: stmt::Record,
}

impl From<Update> for Operation {
    fn from(value: Update) -> Self {
        Self::Update(value)
    }
}

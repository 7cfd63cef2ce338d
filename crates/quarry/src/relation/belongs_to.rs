use crate::{Db, QueryBuilder};

use quarry_core::{
    stmt::{Clause, Op, Record, Value},
    Result,
};

/// A child-to-parent relationship descriptor.
///
/// Created per accessor call and consumed immediately: resolution reads
/// the local key off the source record and issues exactly one foreign
/// query. A record without its local key is an error, never a partial
/// resolution.
#[derive(Debug, Clone)]
pub struct BelongsTo {
    local_key: String,
    foreign_key: String,
    foreign_table: String,
    filters: Vec<Clause>,
}

impl BelongsTo {
    pub fn new(
        local_key: impl Into<String>,
        foreign_key: impl Into<String>,
        foreign_table: impl Into<String>,
    ) -> Self {
        Self {
            local_key: local_key.into(),
            foreign_key: foreign_key.into(),
            foreign_table: foreign_table.into(),
            filters: Vec::new(),
        }
    }

    /// Adds a static filter merged into every resolution.
    pub fn filter(mut self, field: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        self.filters.push(super::static_filter(field, op, value));
        self
    }

    /// The resolution query, exposed so callers can layer additional
    /// constraints before executing.
    pub fn query(&self, db: &Db, record: &Record) -> Result<QueryBuilder> {
        super::foreign_query(
            db,
            record,
            &self.local_key,
            &self.foreign_key,
            &self.foreign_table,
            &self.filters,
        )
    }

    /// Resolve the parent record, if any.
    pub async fn resolve(&self, db: &Db, record: &Record) -> Result<Option<Record>> {
        self.query(db, record)?.first().await
    }
}

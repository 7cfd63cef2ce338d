use crate::{Collection, Db, QueryBuilder};

use quarry_core::{
    stmt::{Clause, Op, Record, Value},
    Result,
};

/// A parent-to-children relationship descriptor.
///
/// Same contract as [`BelongsTo`](crate::BelongsTo), but resolution
/// returns every matching child as an ordered [`Collection`].
#[derive(Debug, Clone)]
pub struct HasMany {
    local_key: String,
    foreign_key: String,
    foreign_table: String,
    filters: Vec<Clause>,
}

impl HasMany {
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

    /// The resolution query, exposed so callers can layer ordering or
    /// further constraints before executing.
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

    /// Resolve every child record.
    pub async fn resolve(&self, db: &Db, record: &Record) -> Result<Collection> {
        self.query(db, record)?.get().await
    }
}

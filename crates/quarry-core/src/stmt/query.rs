use super::{Aggregate, Clause, OrderBy, RawSql};

use serde::{Deserialize, Serialize};

/// The accumulated, cloneable description of a query prior to compilation.
///
/// A `Query` is pure state: the fluent builder mutates it, a compiler turns
/// it into parameterized SQL or a document filter/pipeline. Cloning produces
/// a deep, independent copy — two builders derived from one base never
/// observe each other's later mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Target table (relational) or collection (document).
    pub table: String,

    /// The backend's conventional primary-key column/field for the bound
    /// connection (`"id"` vs `"_id"`).
    pub primary_key: String,

    pub columns: Projection,

    pub filter: Vec<Clause>,

    /// Raw SQL fragment appended to the WHERE clause with `AND`. Only the
    /// relational compiler can honor this.
    pub raw_filter: Option<RawSql>,

    pub order_by: Vec<OrderBy>,

    pub limit: Option<u64>,

    pub offset: Option<u64>,

    /// When set, project one row per distinct combination of these columns.
    pub distinct: Option<Vec<String>>,

    pub aggregate: Option<Aggregate>,

    /// When enabled, an equality comparison against a `%`-bounded string
    /// compiles to a pattern match instead of an exact match.
    pub partial_search: bool,

    /// Document backend only: compile `%`-bounded strings to a text-search
    /// operator instead of an anchored regex.
    pub fuzzy_search: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

impl Query {
    pub fn new(table: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            primary_key: primary_key.into(),
            columns: Projection::All,
            filter: Vec::new(),
            raw_filter: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            distinct: None,
            aggregate: None,
            partial_search: true,
            fuzzy_search: false,
        }
    }

    /// True when the query carries no filtering constraints at all.
    pub fn filter_is_empty(&self) -> bool {
        self.filter.is_empty() && self.raw_filter.is_none()
    }

    pub fn is_aggregate(&self) -> bool {
        self.aggregate.is_some()
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::{Logic, Op};

    #[test]
    fn clone_is_deep() {
        let mut base = Query::new("users", "id");
        base.filter
            .push(Clause::new("age", Op::Gt, 30, Logic::And));

        let mut branch = base.clone();
        branch
            .filter
            .push(Clause::new("name", Op::Eq, "Alice", Logic::And));
        branch.limit = Some(1);

        // The branch never leaks back into the base expression.
        assert_eq!(base.filter.len(), 1);
        assert_eq!(base.limit, None);
        assert_eq!(branch.filter.len(), 2);
    }

    #[test]
    fn round_trips_through_serde() {
        let mut query = Query::new("people", "id");
        query
            .filter
            .push(Clause::new("name", Op::Eq, "%Test%", Logic::And));
        query.limit = Some(10);

        let json = serde_json::to_string(&query).unwrap();
        let back: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(query, back);
    }
}

use super::expr::{OrderByClause, WhereClause};
use super::{Comma, Formatter, Ident, Params, ToSql};

use quarry_core::stmt;

pub(super) struct SelectStmt<'a>(pub(super) &'a stmt::Query);

impl ToSql for SelectStmt<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let query = self.0;
        let table = Ident(&query.table);

        if let Some(aggregate) = &query.aggregate {
            // Aggregates delegate to the backend's native functions and
            // apply only the query's filter.
            fmt!(f, "SELECT " AggregateExpr(aggregate) " FROM " table WhereClause(query));
            return;
        }

        if let Some(distinct) = &query.distinct {
            let columns = Comma(distinct.iter().map(Ident));
            fmt!(f, "SELECT DISTINCT " columns " FROM " table WhereClause(query));

            // Without explicit ordering, distinct rows come back sorted by
            // the distinct columns so results are deterministic.
            if query.order_by.is_empty() {
                let columns = Comma(distinct.iter().map(Ident));
                fmt!(f, " ORDER BY " columns " ASC");
            } else {
                fmt!(f, OrderByClause(&query.order_by));
            }

            fmt!(f, LimitClause(query));
            return;
        }

        fmt!(f, "SELECT " ProjectionSql(&query.columns) " FROM " table
            WhereClause(query)
            OrderByClause(&query.order_by)
            LimitClause(query));
    }
}

pub(super) struct InsertStmt<'a> {
    pub(super) table: &'a str,
    pub(super) row: &'a stmt::Record,
}

impl ToSql for InsertStmt<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let table = Ident(self.table);
        let columns = Comma(self.row.fields().map(Ident));
        let values = Comma(self.row.iter().map(|(_, value)| value));

        fmt!(f, "INSERT INTO " table " (" columns ") VALUES (" values ") RETURNING *");
    }
}

pub(super) struct UpdateStmt<'a> {
    pub(super) query: &'a stmt::Query,
    pub(super) assignments: &'a stmt::Record,
}

impl ToSql for UpdateStmt<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let table = Ident(&self.query.table);
        let assignments = Comma(self.assignments.iter().map(|(field, value)| Assignment {
            field,
            value,
        }));

        // RETURNING hands back the updated rows themselves; update's
        // contract is records, not a count.
        fmt!(f, "UPDATE " table " SET " assignments WhereClause(self.query) " RETURNING *");
    }
}

struct Assignment<'a> {
    field: &'a str,
    value: &'a stmt::Value,
}

impl ToSql for Assignment<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(self.field) " = " self.value);
    }
}

pub(super) struct DeleteStmt<'a>(pub(super) &'a stmt::Query);

impl ToSql for DeleteStmt<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "DELETE FROM " Ident(&self.0.table) WhereClause(self.0));
    }
}

struct ProjectionSql<'a>(&'a stmt::Projection);

impl ToSql for ProjectionSql<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self.0 {
            stmt::Projection::All => fmt!(f, "*"),
            stmt::Projection::Columns(columns) => fmt!(f, Comma(columns.iter().map(Ident))),
        }
    }
}

struct AggregateExpr<'a>(&'a stmt::Aggregate);

impl ToSql for AggregateExpr<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, self.0.func.as_sql() "(");
        match &self.0.field {
            Some(field) => fmt!(f, Ident(field)),
            None => fmt!(f, "*"),
        }
        fmt!(f, ")");
    }
}

struct LimitClause<'a>(&'a stmt::Query);

impl ToSql for LimitClause<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        // Offset without limit is rejected during validation.
        if let Some(limit) = self.0.limit {
            fmt!(f, " LIMIT " limit);
            if let Some(offset) = self.0.offset {
                fmt!(f, " OFFSET " offset);
            }
        }
    }
}

use super::{Comma, Formatter, Ident, Params, ToSql};

use quarry_core::stmt;

/// The full WHERE clause of a query: declared clauses joined by their
/// boolean connectives (SQL left-to-right precedence), followed by any raw
/// fragment appended with AND. Renders nothing when the query carries no
/// constraints.
pub(super) struct WhereClause<'a>(pub(super) &'a stmt::Query);

impl ToSql for WhereClause<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let query = self.0;

        if query.filter_is_empty() {
            return;
        }

        fmt!(f, " WHERE ");

        for (index, clause) in query.filter.iter().enumerate() {
            if index > 0 {
                fmt!(f, match clause.logic {
                    stmt::Logic::And => " AND ",
                    stmt::Logic::Or => " OR ",
                });
            }

            fmt!(f, ClauseSql {
                clause,
                partial_search: query.partial_search,
            });
        }

        if let Some(raw) = &query.raw_filter {
            if !query.filter.is_empty() {
                fmt!(f, " AND ");
            }
            fmt!(f, RawFragment(raw));
        }
    }
}

struct ClauseSql<'a> {
    clause: &'a stmt::Clause,
    partial_search: bool,
}

impl ToSql for ClauseSql<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let clause = self.clause;
        let field = Ident(&clause.field);

        // NULL comparisons have no parameter form.
        if clause.value.is_null() {
            match clause.op {
                stmt::Op::Ne => fmt!(f, field " IS NOT NULL"),
                _ => fmt!(f, field " IS NULL"),
            }
            return;
        }

        let op = if self.partial_search && is_pattern(clause) {
            "LIKE"
        } else {
            clause.op.as_sql()
        };

        fmt!(f, field " " op " ");
        fmt!(f, &clause.value);
    }
}

/// An equality against a `%`-bounded string compiles to a pattern match
/// when partial search is enabled.
pub(super) fn is_pattern(clause: &stmt::Clause) -> bool {
    if clause.op != stmt::Op::Eq {
        return false;
    }
    match &clause.value {
        stmt::Value::String(s) => s.starts_with('%') || s.ends_with('%'),
        _ => false,
    }
}

/// A raw SQL fragment with its own bindings, parenthesized so it cannot
/// change the precedence of the compiled clauses around it.
struct RawFragment<'a>(&'a stmt::RawSql);

impl ToSql for RawFragment<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "(" self.0.fragment.as_str() ")");
        for value in &self.0.bindings {
            // Raw fragments use unnumbered `?` placeholders; bindings are
            // appended in fragment order after all clause bindings.
            f.params.push(value);
        }
    }
}

/// ORDER BY terms in declaration order, never re-sorted.
pub(super) struct OrderByClause<'a>(pub(super) &'a [stmt::OrderBy]);

impl ToSql for OrderByClause<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if self.0.is_empty() {
            return;
        }

        fmt!(f, " ORDER BY " Comma(self.0.iter().map(OrderTerm)));
    }
}

struct OrderTerm<'a>(&'a stmt::OrderBy);

impl ToSql for OrderTerm<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(&self.0.field) " " self.0.direction.as_sql());
    }
}

impl ToSql for &stmt::Value {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let placeholder = f.params.push(self);
        fmt!(f, placeholder);
    }
}

use crate::value::to_bson;

use bson::{doc, oid::ObjectId, Bson, Document};
use quarry_core::stmt::{Clause, Logic, Op, Query, Value};
use quarry_core::Result;

/// Compiles a query's clause list into a MongoDB filter document.
///
/// SQL renders the clause list linearly, where `AND` binds tighter than
/// `OR`. To preserve those semantics here, consecutive `AND`-joined
/// clauses form a group and the groups are combined with `$or`.
pub(crate) fn compile_filter(query: &Query) -> Result<Document> {
    if query.raw_filter.is_some() {
        return Err(quarry_core::Error::expression(
            "raw SQL fragments cannot be applied to a document store",
        ));
    }

    let mut groups: Vec<Vec<Document>> = vec![];

    for clause in &query.filter {
        let condition = compile_clause(query, clause)?;

        match clause.logic {
            Logic::Or if !groups.is_empty() => groups.push(vec![condition]),
            _ => match groups.last_mut() {
                Some(group) => group.push(condition),
                None => groups.push(vec![condition]),
            },
        }
    }

    let mut conjunctions: Vec<Document> = groups
        .into_iter()
        .map(|group| {
            if group.len() == 1 {
                group.into_iter().next().unwrap_or_default()
            } else {
                doc! { "$and": group }
            }
        })
        .collect();

    Ok(match conjunctions.len() {
        0 => Document::new(),
        1 => conjunctions.remove(0),
        _ => doc! { "$or": conjunctions },
    })
}

fn compile_clause(query: &Query, clause: &Clause) -> Result<Document> {
    let field = field_name(query, &clause.field);

    if clause.value == Value::Null {
        return match clause.op {
            Op::Eq => Ok(doc! { field: Bson::Null }),
            Op::Ne => Ok(doc! { field: { "$ne": Bson::Null } }),
            _ => Err(quarry_core::Error::expression(format!(
                "cannot order-compare `{field}` against null",
            ))),
        };
    }

    // Equality against a `%`-bounded string becomes a pattern match when
    // partial search is on, mirroring the LIKE rewrite on the SQL side.
    if clause.op == Op::Eq && query.partial_search {
        if let Value::String(pattern) = &clause.value {
            if is_pattern(pattern) {
                return Ok(pattern_condition(query, field, pattern));
            }
        }
    }

    if clause.op == Op::Like {
        if let Value::String(pattern) = &clause.value {
            return Ok(doc! { field: { "$regex": like_to_regex(pattern), "$options": "i" } });
        }
        return Err(quarry_core::Error::expression(
            "LIKE requires a string pattern",
        ));
    }

    // Historical data may hold `_id` as either a native ObjectId or its
    // hex string, so an equality check on an id matches both forms.
    if clause.op == Op::Eq {
        if let Value::Id(id) = &clause.value {
            if let Ok(oid) = ObjectId::parse_str(id.as_str()) {
                return Ok(doc! {
                    "$or": [
                        { field.clone(): id.as_str() },
                        { field: oid },
                    ]
                });
            }
        }
    }

    let value = to_bson(&clause.value);
    Ok(match clause.op {
        Op::Eq => doc! { field: value },
        Op::Ne => doc! { field: { "$ne": value } },
        Op::Gt => doc! { field: { "$gt": value } },
        Op::Ge => doc! { field: { "$gte": value } },
        Op::Lt => doc! { field: { "$lt": value } },
        Op::Le => doc! { field: { "$lte": value } },
        Op::Like => unreachable!("handled above"),
    })
}

fn field_name(query: &Query, field: &str) -> String {
    if field == query.primary_key {
        "_id".to_string()
    } else {
        field.to_string()
    }
}

fn is_pattern(s: &str) -> bool {
    s.starts_with('%') || s.ends_with('%')
}

fn pattern_condition(query: &Query, field: String, pattern: &str) -> Document {
    let needle = pattern.trim_matches('%');

    if query.fuzzy_search {
        return doc! { "$text": { "$search": needle } };
    }

    let escaped = regex::escape(needle);
    let anchored = match (pattern.starts_with('%'), pattern.ends_with('%')) {
        (true, true) => escaped,
        (true, false) => format!("{escaped}$"),
        (false, true) => format!("^{escaped}"),
        (false, false) => format!("^{escaped}$"),
    };

    doc! { field: { "$regex": anchored, "$options": "i" } }
}

/// Translates a SQL LIKE pattern into an anchored regex. `%` matches any
/// run of characters, `_` a single character.
fn like_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('^');
    for ch in pattern.chars() {
        match ch {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quarry_core::stmt::Id;

    fn query() -> Query {
        Query::new("users", "id")
    }

    fn clause(field: &str, op: Op, value: impl Into<Value>, logic: Logic) -> Clause {
        Clause::new(field, op, value, logic)
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = compile_filter(&query()).unwrap();
        assert_eq!(filter, Document::new());
    }

    #[test]
    fn and_clauses_stay_in_one_group() {
        let mut q = query();
        q.filter.push(clause("age", Op::Ge, 18, Logic::And));
        q.filter.push(clause("active", Op::Eq, true, Logic::And));

        let filter = compile_filter(&q).unwrap();
        assert_eq!(
            filter,
            doc! { "$and": [ { "age": { "$gte": 18_i64 } }, { "active": true } ] }
        );
    }

    #[test]
    fn or_splits_into_disjunct_groups() {
        let mut q = query();
        q.filter.push(clause("age", Op::Ge, 18, Logic::And));
        q.filter.push(clause("active", Op::Eq, true, Logic::And));
        q.filter.push(clause("role", Op::Eq, "admin", Logic::Or));

        let filter = compile_filter(&q).unwrap();
        assert_eq!(
            filter,
            doc! {
                "$or": [
                    { "$and": [ { "age": { "$gte": 18_i64 } }, { "active": true } ] },
                    { "role": "admin" },
                ]
            }
        );
    }

    #[test]
    fn primary_key_field_maps_to_underscore_id() {
        let mut q = query();
        q.filter
            .push(clause("id", Op::Eq, "user-42", Logic::And));

        let filter = compile_filter(&q).unwrap();
        assert_eq!(filter, doc! { "_id": "user-42" });
    }

    #[test]
    fn id_equality_matches_both_representations() {
        let hex = "665f1c2ab4d3e2a1c0ffee00";
        let mut q = query();
        q.filter
            .push(clause("id", Op::Eq, Id::new(hex), Logic::And));

        let filter = compile_filter(&q).unwrap();
        let oid = ObjectId::parse_str(hex).unwrap();
        assert_eq!(
            filter,
            doc! { "$or": [ { "_id": hex }, { "_id": oid } ] }
        );
    }

    #[test]
    fn partial_search_compiles_anchored_regex() {
        let mut q = query();
        q.filter
            .push(clause("name", Op::Eq, "%Test%", Logic::And));
        let filter = compile_filter(&q).unwrap();
        assert_eq!(
            filter,
            doc! { "name": { "$regex": "Test", "$options": "i" } }
        );

        let mut q = query();
        q.filter.push(clause("name", Op::Eq, "%One", Logic::And));
        let filter = compile_filter(&q).unwrap();
        assert_eq!(
            filter,
            doc! { "name": { "$regex": "One$", "$options": "i" } }
        );
    }

    #[test]
    fn partial_search_disabled_compares_exactly() {
        let mut q = query();
        q.partial_search = false;
        q.filter
            .push(clause("name", Op::Eq, "%Test%", Logic::And));

        let filter = compile_filter(&q).unwrap();
        assert_eq!(filter, doc! { "name": "%Test%" });
    }

    #[test]
    fn fuzzy_search_uses_text_operator() {
        let mut q = query();
        q.fuzzy_search = true;
        q.filter
            .push(clause("name", Op::Eq, "%Test%", Logic::And));

        let filter = compile_filter(&q).unwrap();
        assert_eq!(filter, doc! { "$text": { "$search": "Test" } });
    }

    #[test]
    fn null_ordering_comparison_is_rejected() {
        let mut q = query();
        q.filter
            .push(clause("age", Op::Gt, Value::Null, Logic::And));

        assert!(compile_filter(&q).unwrap_err().is_expression());
    }

    #[test]
    fn raw_sql_fragment_is_rejected() {
        let mut q = query();
        q.raw_filter = Some(quarry_core::stmt::RawSql {
            fragment: "age > ?".into(),
            bindings: vec![Value::I64(18)],
        });

        assert!(compile_filter(&q).unwrap_err().is_expression());
    }

    #[test]
    fn like_pattern_translates_wildcards() {
        assert_eq!(like_to_regex("%foo_bar%"), "^.*foo.bar.*$");
        assert_eq!(like_to_regex("a.b"), "^a\\.b$");
    }
}

use pretty_assertions::assert_eq;

use quarry_core::driver::operation::Update;
use quarry_core::record;
use quarry_core::schema::{ColumnType, TableDef};
use quarry_core::stmt::{
    Aggregate, AggregateFunc, Clause, Direction, Logic, Op, OrderBy, Query, RawSql, Value,
};
use quarry_sql::Serializer;

fn query(table: &str) -> Query {
    Query::new(table, "id")
}

#[test]
fn select_all() {
    let mut params = Vec::new();
    let sql = Serializer::sqlite()
        .serialize_query(&query("people"), &mut params)
        .unwrap();

    assert_eq!(sql, r#"SELECT * FROM "people""#);
    assert!(params.is_empty());
}

#[test]
fn select_with_filters_binds_values() {
    let mut q = query("people");
    q.filter.push(Clause::new("age", Op::Gt, 30, Logic::And));
    q.filter
        .push(Clause::new("name", Op::Eq, "Alice", Logic::Or));

    let mut params = Vec::new();
    let sql = Serializer::sqlite().serialize_query(&q, &mut params).unwrap();

    assert_eq!(
        sql,
        r#"SELECT * FROM "people" WHERE "age" > ?1 OR "name" = ?2"#
    );
    assert_eq!(params, [Value::I64(30), Value::String("Alice".into())]);
}

#[test]
fn null_comparison_renders_is_null() {
    let mut q = query("people");
    q.filter
        .push(Clause::new("deleted_at", Op::Eq, Value::Null, Logic::And));
    q.filter
        .push(Clause::new("email", Op::Ne, Value::Null, Logic::And));

    let mut params = Vec::new();
    let sql = Serializer::sqlite().serialize_query(&q, &mut params).unwrap();

    assert_eq!(
        sql,
        r#"SELECT * FROM "people" WHERE "deleted_at" IS NULL AND "email" IS NOT NULL"#
    );
    assert!(params.is_empty());
}

#[test]
fn null_with_ordering_op_is_rejected() {
    let mut q = query("people");
    q.filter
        .push(Clause::new("age", Op::Gt, Value::Null, Logic::And));

    let err = Serializer::sqlite()
        .serialize_query(&q, &mut Vec::new())
        .unwrap_err();
    assert!(err.is_expression());
}

#[test]
fn partial_search_compiles_to_like() {
    let mut q = query("people");
    q.filter
        .push(Clause::new("name", Op::Eq, "%Test%", Logic::And));

    let mut params = Vec::new();
    let sql = Serializer::sqlite().serialize_query(&q, &mut params).unwrap();

    assert_eq!(sql, r#"SELECT * FROM "people" WHERE "name" LIKE ?1"#);
    assert_eq!(params, [Value::String("%Test%".into())]);
}

#[test]
fn partial_search_disabled_stays_exact() {
    let mut q = query("people");
    q.partial_search = false;
    q.filter
        .push(Clause::new("name", Op::Eq, "%Test%", Logic::And));

    let mut params = Vec::new();
    let sql = Serializer::sqlite().serialize_query(&q, &mut params).unwrap();

    assert_eq!(sql, r#"SELECT * FROM "people" WHERE "name" = ?1"#);
}

#[test]
fn order_by_preserves_declaration_order() {
    let mut q = query("people");
    q.order_by.push(OrderBy::new("age", Direction::Desc));
    q.order_by.push(OrderBy::new("name", Direction::Asc));

    let mut params = Vec::new();
    let sql = Serializer::sqlite().serialize_query(&q, &mut params).unwrap();

    assert_eq!(
        sql,
        r#"SELECT * FROM "people" ORDER BY "age" DESC, "name" ASC"#
    );
}

#[test]
fn limit_and_offset() {
    let mut q = query("people");
    q.limit = Some(10);

    let mut params = Vec::new();
    let sql = Serializer::sqlite().serialize_query(&q, &mut params).unwrap();
    assert_eq!(sql, r#"SELECT * FROM "people" LIMIT 10"#);

    q.offset = Some(5);
    let sql = Serializer::sqlite().serialize_query(&q, &mut params).unwrap();
    assert_eq!(sql, r#"SELECT * FROM "people" LIMIT 10 OFFSET 5"#);
}

#[test]
fn offset_without_limit_is_rejected() {
    let mut q = query("people");
    q.offset = Some(5);

    let err = Serializer::sqlite()
        .serialize_query(&q, &mut Vec::new())
        .unwrap_err();
    assert!(err.is_expression());
}

#[test]
fn distinct_defaults_to_ascending_column_order() {
    let mut q = query("people");
    q.distinct = Some(vec!["name".to_string()]);

    let mut params = Vec::new();
    let sql = Serializer::sqlite().serialize_query(&q, &mut params).unwrap();

    assert_eq!(
        sql,
        r#"SELECT DISTINCT "name" FROM "people" ORDER BY "name" ASC"#
    );
}

#[test]
fn aggregate_renders_native_function() {
    let mut q = query("people");
    q.aggregate = Some(Aggregate::count());

    let mut params = Vec::new();
    let sql = Serializer::sqlite().serialize_query(&q, &mut params).unwrap();
    assert_eq!(sql, r#"SELECT COUNT(*) FROM "people""#);

    q.aggregate = Some(Aggregate::new(AggregateFunc::Avg, "age"));
    q.filter.push(Clause::new("age", Op::Gt, 30, Logic::And));

    let mut params = Vec::new();
    let sql = Serializer::sqlite().serialize_query(&q, &mut params).unwrap();
    assert_eq!(sql, r#"SELECT AVG("age") FROM "people" WHERE "age" > ?1"#);
}

#[test]
fn raw_fragment_is_parenthesized_and_binds_after_clauses() {
    let mut q = query("people");
    q.filter.push(Clause::new("age", Op::Gt, 30, Logic::And));
    q.raw_filter = Some(RawSql {
        fragment: "length(name) > ?".to_string(),
        bindings: vec![Value::I64(3)],
    });

    let mut params = Vec::new();
    let sql = Serializer::sqlite().serialize_query(&q, &mut params).unwrap();

    assert_eq!(
        sql,
        r#"SELECT * FROM "people" WHERE "age" > ?1 AND (length(name) > ?)"#
    );
    assert_eq!(params, [Value::I64(30), Value::I64(3)]);
}

#[test]
fn insert_returns_inserted_row() {
    let row = record! { "id" => "p1", "name" => "Alice", "age" => 25 };

    let mut params = Vec::new();
    let sql = Serializer::sqlite()
        .serialize_insert_row("people", &row, &mut params)
        .unwrap();

    assert_eq!(
        sql,
        r#"INSERT INTO "people" ("id", "name", "age") VALUES (?1, ?2, ?3) RETURNING *"#
    );
    assert_eq!(params.len(), 3);
}

#[test]
fn update_applies_assignments_to_matched_rows() {
    let mut q = query("people");
    q.filter
        .push(Clause::new("name", Op::Eq, "Alice", Logic::And));

    let op = Update {
        query: q,
        assignments: record! { "age" => 26 },
    };

    let mut params = Vec::new();
    let sql = Serializer::sqlite().serialize_update(&op, &mut params).unwrap();

    assert_eq!(
        sql,
        r#"UPDATE "people" SET "age" = ?1 WHERE "name" = ?2 RETURNING *"#
    );
    assert_eq!(params, [Value::I64(26), Value::String("Alice".into())]);
}

#[test]
fn delete_matched_rows() {
    let mut q = query("people");
    q.filter.push(Clause::new("age", Op::Lt, 18, Logic::And));

    let mut params = Vec::new();
    let sql = Serializer::sqlite().serialize_delete(&q, &mut params).unwrap();

    assert_eq!(sql, r#"DELETE FROM "people" WHERE "age" < ?1"#);
}

#[test]
fn identifiers_are_quoted_defensively() {
    let q = query(r#"peo"ple"#);
    let mut params = Vec::new();
    let sql = Serializer::sqlite().serialize_query(&q, &mut params).unwrap();
    assert_eq!(sql, r#"SELECT * FROM "peo""ple""#);
}

#[test]
fn create_table_ddl() {
    let def = TableDef::new("people")
        .id("id")
        .column("name", ColumnType::Text)
        .column("age", ColumnType::Integer);

    let sql = Serializer::sqlite().serialize_create_table(&def);
    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS \"people\" (\n    \"id\" TEXT PRIMARY KEY,\n    \"name\" TEXT,\n    \"age\" INTEGER\n)"
    );
}

//! End-to-end coverage against a live MongoDB instance.
//!
//! These tests are skipped unless `QUARRY_MONGODB_URL` points at a running
//! server, e.g. `mongodb://localhost:27017/quarry_test`.

use quarry::{
    record,
    stmt::{Direction, Op, Raw, Value},
    BelongsTo, Db, HasMany, Rows,
};
use quarry_mongodb::MongoDb;

use pretty_assertions::assert_eq;

async fn db() -> Option<Db> {
    let url = std::env::var("QUARRY_MONGODB_URL").ok()?;

    let db = Db::builder()
        .connection("mongo", MongoDb::new(url).unwrap())
        .keep_alive(["mongo"])
        .build()
        .await
        .unwrap();

    Some(db)
}

async fn seed(db: &Db, collection: &str) {
    // Collections persist across runs; start clean.
    db.drop_table(collection).await.unwrap();

    db.query(collection)
        .insert_many(vec![
            record! { "name" => "Test One", "age" => 20, "active" => true, "city" => "Berlin" },
            record! { "name" => "Test Two", "age" => 30, "active" => true, "city" => "Amsterdam" },
            record! { "name" => "Other Person", "age" => 40, "active" => false, "city" => "Berlin" },
            record! { "name" => "Dormant", "age" => 50, "active" => false, "city" => "Chicago" },
        ])
        .await
        .unwrap();
}

#[tokio::test]
async fn count_and_average() {
    let Some(db) = db().await else { return };
    seed(&db, "agg_users").await;

    assert_eq!(db.query("agg_users").count().await.unwrap(), 4);
    assert_eq!(
        db.query("agg_users")
            .filter("active", Op::Eq, true)
            .count()
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        db.query("agg_users").avg("age").await.unwrap(),
        Value::F64(35.0)
    );
}

#[tokio::test]
async fn distinct_defaults_to_alphabetical() {
    let Some(db) = db().await else { return };
    seed(&db, "distinct_users").await;

    let cities = db
        .query("distinct_users")
        .distinct(["city"])
        .get()
        .await
        .unwrap();

    let names: Vec<&Value> = cities.iter().map(|r| r.get("city").unwrap()).collect();
    assert_eq!(
        names,
        vec![
            &Value::String("Amsterdam".into()),
            &Value::String("Berlin".into()),
            &Value::String("Chicago".into()),
        ]
    );
}

#[tokio::test]
async fn partial_search_matches_anchored_patterns() {
    let Some(db) = db().await else { return };
    seed(&db, "search_users").await;

    let both = db
        .query("search_users")
        .filter("name", Op::Eq, "%Test%")
        .order_by("name", Direction::Asc)
        .get()
        .await
        .unwrap();
    assert_eq!(both.len(), 2);

    let suffix = db
        .query("search_users")
        .filter("name", Op::Eq, "%One")
        .get()
        .await
        .unwrap();
    assert_eq!(suffix.len(), 1);
    assert_eq!(
        suffix[0].get("name"),
        Some(&Value::String("Test One".into()))
    );

    let exact = db
        .query("search_users")
        .partial_search(false)
        .filter("name", Op::Eq, "%Test%")
        .get()
        .await
        .unwrap();
    assert!(exact.is_empty());
}

#[tokio::test]
async fn generated_ids_round_trip_through_find() {
    let Some(db) = db().await else { return };
    db.drop_table("id_users").await.unwrap();

    let inserted = db
        .query("id_users")
        .insert(record! { "name" => "Native" })
        .await
        .unwrap();

    let id = inserted[0].get("_id").unwrap().clone();
    assert!(matches!(id, Value::Id(_)));

    let found = db.query("id_users").find(id).await.unwrap().unwrap();
    assert_eq!(found.get("name"), Some(&Value::String("Native".into())));
}

#[tokio::test]
async fn update_returns_exactly_the_updated_records() {
    let Some(db) = db().await else { return };
    seed(&db, "update_users").await;

    let updated = db
        .query("update_users")
        .filter("active", Op::Eq, false)
        .update(record! { "active" => true, "age" => 18 })
        .await
        .unwrap();

    assert_eq!(updated.len(), 2);
    for record in &updated {
        assert_eq!(record.get("active"), Some(&Value::Bool(true)));
        assert_eq!(record.get("age"), Some(&Value::I64(18)));
    }
}

#[tokio::test]
async fn transactions_degrade_to_passthrough() {
    let Some(db) = db().await else { return };
    seed(&db, "tx_users").await;

    // Without multi-statement transactions, completed work sticks even
    // when the callback later fails.
    let result: quarry::Result<()> = db
        .transaction(|db| async move {
            db.query("tx_users")
                .filter("name", Op::Eq, "Dormant")
                .partial_search(false)
                .update(record! { "age" => 99 })
                .await?;
            Err(quarry::err!("boom"))
        })
        .await;

    assert!(result.is_err());
    assert_eq!(
        db.query("tx_users")
            .filter("age", Op::Eq, 99)
            .count()
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn raw_pipeline_escape_hatch() {
    let Some(db) = db().await else { return };
    seed(&db, "pipeline_users").await;

    let response = db
        .query("pipeline_users")
        .raw(Raw::pipeline(vec![
            serde_json::json!({ "$match": { "age": { "$gt": 35 } } }),
            serde_json::json!({ "$sort": { "name": 1 } }),
            serde_json::json!({ "$project": { "_id": 0, "name": 1 } }),
        ]))
        .await
        .unwrap();

    let rows = match response.rows {
        Rows::Values(rows) => rows,
        rows => panic!("expected rows, got {rows:?}"),
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("name"), Some(&Value::String("Dormant".into())));
}

#[tokio::test]
async fn resolvers_match_either_id_representation() {
    let Some(db) = db().await else { return };
    db.drop_table("dual_teams").await.unwrap();
    db.drop_table("dual_users").await.unwrap();

    let teams = db
        .query("dual_teams")
        .insert(record! { "name" => "Platform" })
        .await
        .unwrap();
    let team_id = teams[0].get("_id").unwrap().clone();
    let hex = match &team_id {
        Value::Id(id) => id.as_str().to_string(),
        other => panic!("expected an id, got {other:?}"),
    };

    // One member's foreign key is stored natively, the other as the same
    // id in plain string form.
    db.query("dual_users")
        .insert_many(vec![
            record! { "name" => "Native", "team_id" => team_id.clone() },
            record! { "name" => "Stringly", "team_id" => hex.as_str() },
        ])
        .await
        .unwrap();

    let relation = BelongsTo::new("team_id", "_id", "dual_teams");
    for name in ["Native", "Stringly"] {
        let user = db
            .query("dual_users")
            .partial_search(false)
            .filter("name", Op::Eq, name)
            .first_or_fail()
            .await
            .unwrap();

        let team = relation.resolve(&db, &user).await.unwrap().unwrap();
        assert_eq!(team.get("name"), Some(&Value::String("Platform".into())));
    }

    // The parent side sees both children regardless of how each stored
    // the key.
    let team = db
        .query("dual_teams")
        .find_or_fail(team_id)
        .await
        .unwrap();
    let members = HasMany::new("_id", "team_id", "dual_users")
        .resolve(&db, &team)
        .await
        .unwrap();
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn raw_sql_is_rejected() {
    let Some(db) = db().await else { return };

    let err = db
        .query("anything")
        .raw(Raw::sql("SELECT 1", vec![]))
        .await
        .unwrap_err();
    assert!(err.is_expression());
}

mod belongs_to;
pub use belongs_to::BelongsTo;

mod has_many;
pub use has_many::HasMany;

use crate::{Db, QueryBuilder};

use quarry_core::{
    stmt::{Clause, Logic, Op, Record, Value},
    Error, Result,
};

/// Shared plumbing for the relationship descriptors: read the local key
/// off the source record and build the single foreign query.
fn foreign_query(
    db: &Db,
    record: &Record,
    local_key: &str,
    foreign_key: &str,
    foreign_table: &str,
    filters: &[Clause],
) -> Result<QueryBuilder> {
    let value = match record.get(local_key) {
        Some(value) => value.clone(),
        None => return Err(Error::missing_key(local_key)),
    };

    // A key persisted as a plain string still names an id; promoting it
    // keeps the foreign query matching records that hold the store's
    // native id form of the same value.
    let value = crate::query::id_value(value);

    let mut query = db.query(foreign_table).filter(foreign_key, Op::Eq, value);
    for clause in filters {
        query = match clause.logic {
            Logic::And => query.filter(clause.field.clone(), clause.op, clause.value.clone()),
            Logic::Or => query.or_filter(clause.field.clone(), clause.op, clause.value.clone()),
        };
    }

    Ok(query)
}

fn static_filter(field: impl Into<String>, op: Op, value: impl Into<Value>) -> Clause {
    Clause::new(field, op, value, Logic::And)
}

#[cfg(test)]
mod tests {
    use super::*;

    use quarry_core::{
        async_trait,
        driver::{operation::Operation, Capability, Driver, Response},
        record,
        stmt::Id,
    };

    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Doc;

    #[async_trait]
    impl Driver for Doc {
        fn capability(&self) -> &'static Capability {
            &Capability::MONGODB
        }

        async fn connect(&self) -> Result<()> {
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }

        async fn exec(&self, _op: Operation) -> Result<Response> {
            Ok(Response::empty())
        }
    }

    async fn db() -> Db {
        Db::builder().connection("main", Doc).build().await.unwrap()
    }

    #[tokio::test]
    async fn string_local_keys_are_promoted_to_ids() {
        let hex = "665f1c2ab4d3e2a1c0ffee00";
        let record = record! { "team_id" => hex };

        let query = BelongsTo::new("team_id", "_id", "teams")
            .query(&db().await, &record)
            .unwrap();

        // The foreign comparison carries an id, not a plain string, so a
        // key stored in either representation can match.
        assert_eq!(
            query.expression().filter[0].value,
            Value::Id(Id::new(hex))
        );
    }

    #[tokio::test]
    async fn id_local_keys_pass_through_unchanged() {
        let id = Id::new("665f1c2ab4d3e2a1c0ffee00");
        let record = record! { "_id" => id.clone() };

        let query = HasMany::new("_id", "team_id", "users")
            .query(&db().await, &record)
            .unwrap();

        assert_eq!(query.expression().filter[0].value, Value::Id(id));
    }

    #[tokio::test]
    async fn missing_local_key_is_an_error() {
        let record = record! { "name" => "No Team" };

        let err = BelongsTo::new("team_id", "_id", "teams")
            .query(&db().await, &record)
            .unwrap_err();

        assert!(err.is_missing_key());
    }
}

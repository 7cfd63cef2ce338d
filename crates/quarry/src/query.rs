use crate::Collection;

use quarry_core::{
    driver::{
        operation::{Delete, Insert, Operation, RawQuery, Update},
        Driver, Response,
    },
    stmt::{
        self, Aggregate, AggregateFunc, Clause, Direction, Id, Logic, Op, OrderBy, Projection,
        Raw, RawSql, Record, Value,
    },
    Error, Result,
};

use std::{future::Future, sync::Arc};

/// Fluent query builder bound to one adapter and one table.
///
/// Builders are owned values: every mutator consumes and returns `self`,
/// and `Clone` deep-copies the accumulated expression. Branching a base
/// query into divergent filters therefore requires an explicit `clone()`,
/// which makes cross-contamination between branches impossible.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    driver: Arc<dyn Driver>,
    query: stmt::Query,
}

impl QueryBuilder {
    pub(crate) fn new(
        driver: Arc<dyn Driver>,
        table: impl Into<String>,
        primary_key: Option<&str>,
    ) -> Self {
        let primary_key = primary_key.unwrap_or(driver.capability().primary_key);
        let query = stmt::Query::new(table, primary_key);
        Self { driver, query }
    }

    /// The accumulated expression. Mostly useful for diagnostics.
    pub fn expression(&self) -> &stmt::Query {
        &self.query
    }

    pub fn filter(mut self, field: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        self.query
            .filter
            .push(Clause::new(field, op, value, Logic::And));
        self
    }

    /// Like [`filter`](Self::filter), but joined to the preceding clause
    /// with `OR`.
    pub fn or_filter(mut self, field: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        self.query
            .filter
            .push(Clause::new(field, op, value, Logic::Or));
        self
    }

    /// Appends a raw SQL fragment to the compiled WHERE clause. Relational
    /// backends only; the document compiler rejects it.
    pub fn filter_raw(mut self, fragment: impl Into<String>, bindings: Vec<Value>) -> Self {
        self.query.raw_filter = Some(RawSql {
            fragment: fragment.into(),
            bindings,
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.query.order_by.push(OrderBy::new(field, direction));
        self
    }

    /// Newest first: `ORDER BY field DESC`.
    pub fn latest(self, field: impl Into<String>) -> Self {
        self.order_by(field, Direction::Desc)
    }

    /// Oldest first: `ORDER BY field ASC`.
    pub fn oldest(self, field: impl Into<String>) -> Self {
        self.order_by(field, Direction::Asc)
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.query.offset = Some(offset);
        self
    }

    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.columns = Projection::Columns(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn distinct<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.distinct = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Controls the `%`-bounded pattern rewrite on equality comparisons.
    /// On by default.
    pub fn partial_search(mut self, enabled: bool) -> Self {
        self.query.partial_search = enabled;
        self
    }

    /// Document backend only: route `%`-bounded patterns through the text
    /// search operator instead of an anchored regex.
    pub fn fuzzy_search(mut self, enabled: bool) -> Self {
        self.query.fuzzy_search = enabled;
        self
    }

    /// Execute the query and return every matched record.
    pub async fn get(self) -> Result<Collection> {
        let records = self.exec_query().await?.into_values()?;
        Ok(Collection::new(records))
    }

    /// Alias for [`get`](Self::get).
    pub async fn all(self) -> Result<Collection> {
        self.get().await
    }

    pub async fn first(self) -> Result<Option<Record>> {
        let collection = self.limit(1).get().await?;
        Ok(collection.into_iter().next())
    }

    pub async fn first_or_fail(self) -> Result<Record> {
        let table = self.query.table.clone();
        match self.first().await? {
            Some(record) => Ok(record),
            None => Err(Error::record_not_found(format!("table `{table}`"))),
        }
    }

    /// Look up a single record by primary key.
    pub async fn find(self, id: impl Into<Value>) -> Result<Option<Record>> {
        let primary_key = self.query.primary_key.clone();
        self.filter(primary_key, Op::Eq, id_value(id.into()))
            .first()
            .await
    }

    pub async fn find_or_fail(self, id: impl Into<Value>) -> Result<Record> {
        let table = self.query.table.clone();
        let id = id.into();
        match self.find(id.clone()).await? {
            Some(record) => Ok(record),
            None => Err(Error::record_not_found(format!(
                "table `{table}`, id `{id:?}`"
            ))),
        }
    }

    pub async fn count(self) -> Result<u64> {
        let value = self.aggregate(Aggregate::count()).await?;
        Ok(value.as_i64().unwrap_or(0) as u64)
    }

    pub async fn sum(self, field: impl Into<String>) -> Result<Value> {
        self.aggregate(Aggregate::new(AggregateFunc::Sum, field)).await
    }

    pub async fn avg(self, field: impl Into<String>) -> Result<Value> {
        self.aggregate(Aggregate::new(AggregateFunc::Avg, field)).await
    }

    pub async fn min(self, field: impl Into<String>) -> Result<Value> {
        self.aggregate(Aggregate::new(AggregateFunc::Min, field)).await
    }

    pub async fn max(self, field: impl Into<String>) -> Result<Value> {
        self.aggregate(Aggregate::new(AggregateFunc::Max, field)).await
    }

    /// Insert one record, returning it (with a generated primary key when
    /// none was supplied).
    pub async fn insert(self, record: Record) -> Result<Collection> {
        self.insert_many(vec![record]).await
    }

    pub async fn insert_many(self, mut rows: Vec<Record>) -> Result<Collection> {
        self.fill_primary_keys(&mut rows);

        let op = Insert {
            table: self.query.table.clone(),
            primary_key: self.query.primary_key.clone(),
            rows,
        };

        let records = self.exec(op).await?.into_values()?;
        Ok(Collection::new(records))
    }

    /// Apply a partial attribute merge to every currently-matched record,
    /// returning the updated records.
    pub async fn update(self, assignments: Record) -> Result<Collection> {
        let op = Update {
            query: self.query.clone(),
            assignments,
        };

        let records = self.exec(op).await?.into_values()?;
        Ok(Collection::new(records))
    }

    /// Alias for [`update`](Self::update); both apply to every matched
    /// record.
    pub async fn update_all(self, assignments: Record) -> Result<Collection> {
        self.update(assignments).await
    }

    /// Delete every matched record, returning the deleted count.
    pub async fn delete(self) -> Result<u64> {
        let op = Delete {
            query: self.query.clone(),
        };

        self.exec(op).await?.into_count()
    }

    /// Alias for [`delete`](Self::delete).
    pub async fn delete_all(self) -> Result<u64> {
        self.delete().await
    }

    /// Runs `f` inside a transaction on the builder's bound connection.
    ///
    /// The callback receives this builder back (accumulated expression
    /// intact) as its transaction-scoped handle. Same contract as
    /// [`Db::transaction`](crate::Db::transaction): commit on success,
    /// rollback and resurface the callback's error on failure, plain
    /// passthrough on backends without transactions.
    pub async fn transaction<F, Fut, T>(self, f: F) -> Result<T>
    where
        F: FnOnce(QueryBuilder) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let driver = self.driver.clone();
        let scope = self.query.table.clone();
        crate::db::execute_transactional(&driver, &scope, move || f(self)).await
    }

    /// Backend-native escape hatch: a SQL statement or an aggregation
    /// pipeline, depending on the bound backend.
    pub async fn raw(self, raw: Raw) -> Result<Response> {
        let op = RawQuery {
            table: Some(self.query.table.clone()),
            raw,
        };

        self.exec(op).await
    }

    async fn aggregate(mut self, aggregate: Aggregate) -> Result<Value> {
        self.query.aggregate = Some(aggregate);
        self.exec_query().await?.into_aggregate()
    }

    async fn exec_query(self) -> Result<Response> {
        let op = Operation::Query(self.query.clone());
        self.driver.exec(op).await
    }

    async fn exec(&self, op: impl Into<Operation>) -> Result<Response> {
        self.driver.exec(op.into()).await
    }

    /// Relational backends have no server-side id generation hook, so a
    /// missing primary key is filled with a fresh UUID before the insert
    /// ships. The document backend generates its own native ids.
    fn fill_primary_keys(&self, rows: &mut [Record]) {
        if !self.driver.capability().sql {
            return;
        }

        for row in rows {
            if row.get(&self.query.primary_key).is_none() {
                let id = Id::new(uuid::Uuid::new_v4().to_string());
                row.insert(self.query.primary_key.clone(), Value::Id(id));
            }
        }
    }
}

/// `find` and the relationship resolvers compare against id columns, so
/// plain strings are promoted to id values; this is what lets the document
/// compiler's id shim apply.
pub(crate) fn id_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::Id(Id::new(s)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use quarry_core::{async_trait, driver::Capability};

    #[derive(Debug)]
    struct Null;

    #[async_trait]
    impl Driver for Null {
        fn capability(&self) -> &'static Capability {
            &Capability::SQLITE
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

    fn builder() -> QueryBuilder {
        QueryBuilder::new(Arc::new(Null), "users", None)
    }

    #[test]
    fn primary_key_defaults_from_capability() {
        assert_eq!(builder().expression().primary_key, "id");
    }

    #[test]
    fn cloned_builders_diverge_independently() {
        let base = builder().filter("active", Op::Eq, true);

        let adults = base.clone().filter("age", Op::Ge, 18);
        let named = base.clone().filter("name", Op::Eq, "%Test%");

        assert_eq!(base.expression().filter.len(), 1);
        assert_eq!(adults.expression().filter.len(), 2);
        assert_eq!(named.expression().filter.len(), 2);
        assert_eq!(named.expression().filter[1].field, "name");
    }

    #[test]
    fn latest_and_oldest_are_ordering_sugar() {
        let q = builder().latest("created_at").oldest("name");

        let order = &q.expression().order_by;
        assert_eq!(order.len(), 2);
        assert_eq!(order[0].direction, Direction::Desc);
        assert_eq!(order[1].direction, Direction::Asc);
    }

    #[test]
    fn select_replaces_the_projection() {
        let q = builder().select(["id", "name"]);
        assert_eq!(
            q.expression().columns,
            Projection::Columns(vec!["id".into(), "name".into()])
        );
    }

    #[test]
    fn string_ids_are_promoted() {
        assert_eq!(
            id_value(Value::String("abc".into())),
            Value::Id(Id::new("abc"))
        );
        assert_eq!(id_value(Value::I64(7)), Value::I64(7));
    }
}

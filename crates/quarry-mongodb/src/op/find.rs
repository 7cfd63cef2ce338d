use crate::filter::compile_filter;
use crate::pipeline::{aggregate_pipeline, distinct_pipeline};
use crate::value::{document_to_record, from_bson};
use crate::MongoDb;

use bson::Document;
use futures::TryStreamExt;
use quarry_core::{
    driver::Response,
    stmt::{self, AggregateFunc, Projection},
    Error, Result,
};

pub(crate) async fn execute(driver: &MongoDb, query: stmt::Query) -> Result<Response> {
    if query.offset.is_some() && query.limit.is_none() {
        return Err(Error::expression("offset requires a limit"));
    }

    if query.is_aggregate() {
        return aggregate(driver, query).await;
    }
    if query.is_distinct() {
        return distinct(driver, query).await;
    }

    let database = driver.database().await?;
    let collection = database.collection::<Document>(&query.table);

    let filter = compile_filter(&query)?;

    let mut find = collection.find(filter);
    if !query.order_by.is_empty() {
        find = find.sort(sort_document(&query));
    }
    if let Some(limit) = query.limit {
        find = find.limit(limit as i64);
    }
    if let Some(offset) = query.offset {
        find = find.skip(offset);
    }
    if let Some(projection) = projection_document(&query) {
        find = find.projection(projection);
    }

    let docs: Vec<Document> = find
        .await
        .map_err(Error::adapter)?
        .try_collect()
        .await
        .map_err(Error::adapter)?;

    let records = docs
        .into_iter()
        .map(|doc| document_to_record(doc, &query.primary_key))
        .collect();

    Ok(Response::values(records))
}

async fn aggregate(driver: &MongoDb, query: stmt::Query) -> Result<Response> {
    let pipeline = aggregate_pipeline(&query)?;
    let mut docs = run_pipeline(driver, &query.table, pipeline).await?;

    let value = match docs.pop() {
        Some(mut doc) => doc
            .remove("result")
            .map(from_bson)
            .unwrap_or(stmt::Value::Null),
        // Nothing matched, so the `$group` stage never ran. COUNT of an
        // empty set is zero; the other functions are undefined.
        None => match query.aggregate.as_ref().map(|agg| agg.func) {
            Some(AggregateFunc::Count) => stmt::Value::I64(0),
            _ => stmt::Value::Null,
        },
    };

    Ok(Response::aggregate(value))
}

async fn distinct(driver: &MongoDb, query: stmt::Query) -> Result<Response> {
    let pipeline = distinct_pipeline(&query)?;
    let docs = run_pipeline(driver, &query.table, pipeline).await?;

    let records = docs
        .into_iter()
        .map(|doc| document_to_record(doc, &query.primary_key))
        .collect();

    Ok(Response::values(records))
}

pub(crate) async fn run_pipeline(
    driver: &MongoDb,
    collection: &str,
    pipeline: Vec<Document>,
) -> Result<Vec<Document>> {
    let database = driver.database().await?;
    let collection = database.collection::<Document>(collection);

    collection
        .aggregate(pipeline)
        .await
        .map_err(Error::adapter)?
        .try_collect()
        .await
        .map_err(Error::adapter)
}

fn sort_document(query: &stmt::Query) -> Document {
    let mut sort = Document::new();
    for order in &query.order_by {
        let field = if order.field == query.primary_key {
            "_id".to_string()
        } else {
            order.field.clone()
        };
        sort.insert(field, order.direction.as_int());
    }
    sort
}

fn projection_document(query: &stmt::Query) -> Option<Document> {
    let columns = match &query.columns {
        Projection::All => return None,
        Projection::Columns(columns) => columns,
    };

    let mut projection = Document::new();
    let mut keep_id = false;
    for column in columns {
        if column == &query.primary_key {
            keep_id = true;
        } else {
            projection.insert(column.clone(), 1);
        }
    }
    // `_id` comes back by default; suppress it unless the key column was
    // asked for.
    projection.insert("_id", if keep_id { 1 } else { 0 });
    Some(projection)
}

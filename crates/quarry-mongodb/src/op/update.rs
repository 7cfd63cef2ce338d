use crate::filter::compile_filter;
use crate::value::{document_to_record, to_bson};
use crate::MongoDb;

use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use quarry_core::{
    driver::{operation::Update, Response},
    Error, Result,
};

/// Updates every matched document and returns the updated records.
///
/// MongoDB's `update_many` only reports counts, so the matched ids are
/// captured first and the documents refetched by id afterwards.
pub(crate) async fn execute(driver: &MongoDb, op: Update) -> Result<Response> {
    if op.assignments.is_empty() {
        return Err(Error::expression("update requires at least one assignment"));
    }

    let filter = compile_filter(&op.query)?;

    let database = driver.database().await?;
    let collection = database.collection::<Document>(&op.query.table);

    let ids: Vec<Bson> = collection
        .find(filter)
        .projection(doc! { "_id": 1 })
        .await
        .map_err(Error::adapter)?
        .try_collect::<Vec<Document>>()
        .await
        .map_err(Error::adapter)?
        .into_iter()
        .filter_map(|mut doc| doc.remove("_id"))
        .collect();

    if ids.is_empty() {
        return Ok(Response::empty());
    }

    let mut set = Document::new();
    for (field, value) in op.assignments.iter() {
        if field == op.query.primary_key {
            return Err(Error::expression("the primary key cannot be reassigned"));
        }
        set.insert(field, to_bson(value));
    }

    collection
        .update_many(doc! { "_id": { "$in": ids.clone() } }, doc! { "$set": set })
        .await
        .map_err(Error::adapter)?;

    let docs: Vec<Document> = collection
        .find(doc! { "_id": { "$in": ids } })
        .await
        .map_err(Error::adapter)?
        .try_collect()
        .await
        .map_err(Error::adapter)?;

    let records = docs
        .into_iter()
        .map(|doc| document_to_record(doc, &op.query.primary_key))
        .collect();

    Ok(Response::values(records))
}

use crate::value::record_to_document;
use crate::MongoDb;

use bson::{oid::ObjectId, Document};
use quarry_core::{
    driver::{operation::Insert, Response},
    stmt::{Id, Value},
    Error, Result,
};

pub(crate) async fn execute(driver: &MongoDb, mut op: Insert) -> Result<Response> {
    if op.rows.is_empty() {
        return Err(Error::expression("insert requires at least one record"));
    }

    // Ids are generated client side so the inserted records can be echoed
    // back without a refetch.
    for row in &mut op.rows {
        if row.get(&op.primary_key).is_none() {
            let id = Id::new(ObjectId::new().to_hex());
            row.insert(op.primary_key.clone(), Value::Id(id));
        }
    }

    let docs: Vec<Document> = op
        .rows
        .iter()
        .map(|row| record_to_document(row, &op.primary_key))
        .collect();

    let database = driver.database().await?;
    database
        .collection::<Document>(&op.table)
        .insert_many(docs)
        .await
        .map_err(Error::adapter)?;

    Ok(Response::values(op.rows))
}

use crate::filter::compile_filter;
use crate::MongoDb;

use bson::Document;
use quarry_core::{
    driver::{operation::Delete, Response},
    Error, Result,
};

pub(crate) async fn execute(driver: &MongoDb, op: Delete) -> Result<Response> {
    let filter = compile_filter(&op.query)?;

    let database = driver.database().await?;
    let result = database
        .collection::<Document>(&op.query.table)
        .delete_many(filter)
        .await
        .map_err(Error::adapter)?;

    Ok(Response::count(result.deleted_count))
}

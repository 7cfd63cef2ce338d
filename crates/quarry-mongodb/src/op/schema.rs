use crate::MongoDb;

use bson::Document;
use quarry_core::{
    driver::{operation::SchemaOp, Response},
    stmt::Value,
    Error, Result,
};

pub(crate) async fn execute(driver: &MongoDb, op: SchemaOp) -> Result<Response> {
    let database = driver.database().await?;

    match op {
        // Collections are schemaless; the column definitions only matter
        // to the relational backend. Creation is made idempotent to match
        // `CREATE TABLE IF NOT EXISTS`.
        SchemaOp::CreateTable(def) => {
            if !collection_exists(driver, &def.name).await? {
                database
                    .create_collection(&def.name)
                    .await
                    .map_err(Error::adapter)?;
            }
            Ok(Response::count(0))
        }
        SchemaOp::DropTable(name) => {
            database
                .collection::<Document>(&name)
                .drop()
                .await
                .map_err(Error::adapter)?;
            Ok(Response::count(0))
        }
        SchemaOp::TableExists(name) => {
            let exists = collection_exists(driver, &name).await?;
            Ok(Response::aggregate(Value::Bool(exists)))
        }
    }
}

async fn collection_exists(driver: &MongoDb, name: &str) -> Result<bool> {
    let names = driver
        .database()
        .await?
        .list_collection_names()
        .await
        .map_err(Error::adapter)?;

    Ok(names.iter().any(|existing| existing == name))
}

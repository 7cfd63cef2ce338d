mod delete;
mod find;
mod insert;
mod raw;
mod schema;
mod transaction;
mod update;

use crate::MongoDb;
use quarry_core::{
    driver::{operation::Operation, Response},
    Result,
};

pub(crate) async fn execute_operation(driver: &MongoDb, op: Operation) -> Result<Response> {
    match op {
        Operation::Query(op) => find::execute(driver, op).await,
        Operation::Insert(op) => insert::execute(driver, op).await,
        Operation::Update(op) => update::execute(driver, op).await,
        Operation::Delete(op) => delete::execute(driver, op).await,
        Operation::Raw(op) => raw::execute(driver, op).await,
        Operation::Transaction(op) => transaction::execute(driver, op).await,
        Operation::Schema(op) => schema::execute(driver, op).await,
    }
}

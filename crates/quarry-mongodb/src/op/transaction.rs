use crate::MongoDb;

use quarry_core::{
    driver::{operation::Transaction, Response},
    Result,
};

/// Transaction boundaries degrade to no-ops here; the driver advertises
/// `transactions: false` and callers fall back to sequential execution.
pub(crate) async fn execute(_driver: &MongoDb, op: Transaction) -> Result<Response> {
    tracing::debug!(target: "quarry::mongodb", ?op, "transaction boundary ignored");
    Ok(Response::count(0))
}

use crate::value::document_to_record;
use crate::MongoDb;

use bson::Document;
use quarry_core::{
    driver::{operation::RawQuery, Response},
    stmt::Raw,
    Error, Result,
};

/// Runs a caller-supplied aggregation pipeline verbatim.
pub(crate) async fn execute(driver: &MongoDb, op: RawQuery) -> Result<Response> {
    let stages = match op.raw {
        Raw::Pipeline(stages) => stages,
        Raw::Sql { .. } => {
            return Err(Error::expression(
                "raw SQL cannot be executed against a document store",
            ))
        }
    };

    let table = op.table.ok_or_else(|| {
        Error::expression("a raw pipeline must name its target collection")
    })?;

    if stages.is_empty() {
        return Err(Error::expression("raw pipeline is empty"));
    }

    let pipeline = stages
        .iter()
        .map(bson::to_document)
        .collect::<std::result::Result<Vec<Document>, _>>()
        .map_err(Error::adapter)?;

    let docs = super::find::run_pipeline(driver, &table, pipeline).await?;

    // Pipelines shape their own output; only `_id` gets the usual id
    // normalization.
    let records = docs
        .into_iter()
        .map(|doc| document_to_record(doc, "_id"))
        .collect();

    Ok(Response::values(records))
}

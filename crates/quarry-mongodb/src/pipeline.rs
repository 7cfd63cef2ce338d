use crate::filter::compile_filter;

use bson::{doc, Bson, Document};
use quarry_core::stmt::{AggregateFunc, Query};
use quarry_core::Result;

/// Builds the pipeline for an aggregate query: an optional `$match`
/// followed by a single `$group` over the whole matched set.
pub(crate) fn aggregate_pipeline(query: &Query) -> Result<Vec<Document>> {
    let aggregate = match &query.aggregate {
        Some(aggregate) => aggregate,
        None => return Err(quarry_core::Error::expression("query is not an aggregate")),
    };

    let accumulator = match (aggregate.func, &aggregate.field) {
        (AggregateFunc::Count, _) => doc! { "$sum": 1 },
        (func, Some(field)) => {
            let path = format!("${}", field_name(query, field));
            match func {
                AggregateFunc::Sum => doc! { "$sum": path },
                AggregateFunc::Avg => doc! { "$avg": path },
                AggregateFunc::Min => doc! { "$min": path },
                AggregateFunc::Max => doc! { "$max": path },
                AggregateFunc::Count => unreachable!(),
            }
        }
        (func, None) => {
            return Err(quarry_core::Error::expression(format!(
                "{} requires a field",
                func.as_sql()
            )))
        }
    };

    let mut pipeline = Vec::new();
    push_match(&mut pipeline, query)?;
    pipeline.push(doc! { "$group": { "_id": Bson::Null, "result": accumulator } });
    Ok(pipeline)
}

/// Builds the pipeline for a distinct query. Grouping on the column
/// combination deduplicates; the trailing `$project` flattens the group
/// key back into plain fields.
pub(crate) fn distinct_pipeline(query: &Query) -> Result<Vec<Document>> {
    let columns = match &query.distinct {
        Some(columns) if !columns.is_empty() => columns,
        _ => return Err(quarry_core::Error::expression("query is not distinct")),
    };

    let mut key = Document::new();
    for column in columns {
        let stored = field_name(query, column);
        key.insert(column.clone(), format!("${stored}"));
    }

    let mut pipeline = Vec::new();
    push_match(&mut pipeline, query)?;
    pipeline.push(doc! { "$group": { "_id": key } });

    // Deduplicated output has no stable order of its own. Without an
    // explicit ordering, fall back to the distinct columns ascending so
    // both backends agree.
    let sort = if query.order_by.is_empty() {
        let mut sort = Document::new();
        for column in columns {
            sort.insert(format!("_id.{column}"), 1);
        }
        sort
    } else {
        let mut sort = Document::new();
        for order in &query.order_by {
            sort.insert(format!("_id.{}", order.field), order.direction.as_int());
        }
        sort
    };
    pipeline.push(doc! { "$sort": sort });

    if let Some(offset) = query.offset {
        pipeline.push(doc! { "$skip": offset as i64 });
    }
    if let Some(limit) = query.limit {
        pipeline.push(doc! { "$limit": limit as i64 });
    }

    let mut projection = doc! { "_id": 0 };
    for column in columns {
        projection.insert(column.clone(), format!("$_id.{column}"));
    }
    pipeline.push(doc! { "$project": projection });

    Ok(pipeline)
}

fn push_match(pipeline: &mut Vec<Document>, query: &Query) -> Result<()> {
    let filter = compile_filter(query)?;
    if !filter.is_empty() {
        pipeline.push(doc! { "$match": filter });
    }
    Ok(())
}

fn field_name(query: &Query, field: &str) -> String {
    if field == query.primary_key {
        "_id".to_string()
    } else {
        field.to_string()
    }
}

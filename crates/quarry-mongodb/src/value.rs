use bson::{oid::ObjectId, Bson, Document};
use quarry_core::stmt::{Id, Record, Value};

/// The engine's values in BSON form.
///
/// Ids are the delicate case: an [`Id`] that parses as an `ObjectId` is
/// written in native form, everything else as a plain string.
pub fn to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(v) => Bson::Boolean(*v),
        Value::I64(v) => Bson::Int64(*v),
        Value::F64(v) => Bson::Double(*v),
        Value::String(v) => Bson::String(v.clone()),
        Value::Id(id) => match ObjectId::parse_str(id.as_str()) {
            Ok(oid) => Bson::ObjectId(oid),
            Err(_) => Bson::String(id.as_str().to_string()),
        },
    }
}

pub fn from_bson(bson: Bson) -> Value {
    match bson {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(v) => Value::Bool(v),
        Bson::Int32(v) => Value::I64(v as i64),
        Bson::Int64(v) => Value::I64(v),
        Bson::Double(v) => Value::F64(v),
        Bson::String(v) => Value::String(v),
        Bson::ObjectId(oid) => Value::Id(Id::new(oid.to_hex())),
        // Anything outside the engine's vocabulary round-trips as its
        // canonical JSON string form rather than being dropped.
        other => Value::String(other.to_string()),
    }
}

/// Converts a record into an insertable document, mapping the logical
/// primary-key field onto `_id`.
pub fn record_to_document(record: &Record, primary_key: &str) -> Document {
    let mut doc = Document::new();
    for (field, value) in record.iter() {
        let name = if field == primary_key { "_id" } else { field };
        doc.insert(name, to_bson(value));
    }
    doc
}

/// Converts a stored document back into a record, mapping `_id` onto the
/// logical primary-key field name.
pub fn document_to_record(doc: Document, primary_key: &str) -> Record {
    let mut record = Record::new();
    for (field, value) in doc {
        if field == "_id" {
            record.insert(primary_key, id_value(value));
        } else {
            record.insert(field, from_bson(value));
        }
    }
    record
}

/// `_id` values surface as [`Value::Id`] regardless of how they were
/// persisted, so both historical representations compare equal upstream.
fn id_value(bson: Bson) -> Value {
    match bson {
        Bson::ObjectId(oid) => Value::Id(Id::new(oid.to_hex())),
        Bson::String(v) => Value::Id(Id::new(v)),
        other => from_bson(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quarry_core::record;

    #[test]
    fn id_round_trip_prefers_native_form() {
        let id = Id::new("665f1c2ab4d3e2a1c0ffee00");
        let bson = to_bson(&Value::Id(id.clone()));
        assert!(matches!(bson, Bson::ObjectId(_)));
        assert_eq!(from_bson(bson), Value::Id(id));
    }

    #[test]
    fn non_hex_id_falls_back_to_string() {
        let bson = to_bson(&Value::Id(Id::new("user-42")));
        assert_eq!(bson, Bson::String("user-42".to_string()));
    }

    #[test]
    fn primary_key_maps_to_underscore_id() {
        let record = record! { "id" => Id::new("user-42"), "name" => "Alice" };
        let doc = record_to_document(&record, "id");
        assert!(doc.contains_key("_id"));
        assert!(!doc.contains_key("id"));

        let back = document_to_record(doc, "id");
        assert_eq!(back.get("id"), Some(&Value::Id(Id::new("user-42"))));
        assert_eq!(back.get("name"), Some(&Value::String("Alice".into())));
    }
}

use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use quarry_core::stmt::{self, Value as CoreValue};

/// Bridge between the engine's value vocabulary and SQLite's.
#[derive(Debug)]
pub(crate) struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use stmt::Value::*;

        match &self.0 {
            Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            Bool(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            Bool(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            // Ids are stored as text on the relational backend.
            Id(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_str().as_bytes()))),
        }
    }
}

/// Converts a SQLite column value into the engine's value vocabulary.
pub(crate) fn from_sql(value: ValueRef<'_>) -> quarry_core::Result<CoreValue> {
    Ok(match value {
        ValueRef::Null => CoreValue::Null,
        ValueRef::Integer(v) => CoreValue::I64(v),
        ValueRef::Real(v) => CoreValue::F64(v),
        ValueRef::Text(bytes) => CoreValue::String(
            std::str::from_utf8(bytes)
                .map_err(quarry_core::Error::adapter)?
                .to_string(),
        ),
        ValueRef::Blob(_) => {
            return Err(quarry_core::err!(
                "BLOB columns are not part of the engine's value vocabulary"
            ))
        }
    })
}

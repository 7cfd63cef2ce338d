use super::Value;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An insertion-ordered field-name → value map.
///
/// Every row or document crossing the engine boundary has this shape: rows
/// read from the relational backend, documents read from the document
/// backend, insert payloads, and update assignment sets.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

/// Builds a [`Record`](crate::stmt::Record) from `key => value` pairs.
#[macro_export]
macro_rules! record {
    () => { $crate::stmt::Record::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::stmt::Record::new();
        $( record.insert($key, $value); )+
        record
    }};
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.shift_remove(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::stmt::Value;

    #[test]
    fn preserves_insertion_order() {
        let record = record! {
            "name" => "Alice",
            "age" => 25,
        };

        let fields: Vec<_> = record.fields().collect();
        assert_eq!(fields, ["name", "age"]);
        assert_eq!(record.get("age"), Some(&Value::I64(25)));
        assert_eq!(record.get("missing"), None);
    }
}

use super::Value;

use serde::{Deserialize, Serialize};

/// Backend-native escape hatch.
///
/// This is the one place the abstraction leaks by design: the input shape
/// is intentionally backend-specific, so the variant names which backend
/// the caller is targeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Raw {
    /// A SQL statement with positional bindings (relational backend).
    Sql { sql: String, bindings: Vec<Value> },

    /// Ordered aggregation-pipeline stages (document backend). Stages are
    /// JSON documents; the adapter converts them to its native form.
    Pipeline(Vec<serde_json::Value>),
}

impl Raw {
    pub fn sql(sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        Self::Sql {
            sql: sql.into(),
            bindings,
        }
    }

    pub fn pipeline(stages: Vec<serde_json::Value>) -> Self {
        Self::Pipeline(stages)
    }
}

/// A raw SQL fragment merged into a compiled WHERE clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSql {
    pub fragment: String,
    pub bindings: Vec<Value>,
}

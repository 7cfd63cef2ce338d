use serde::{Deserialize, Serialize};

/// A requested aggregate computation, delegated to the backend's native
/// aggregation machinery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub func: AggregateFunc,

    /// The field the aggregate applies to. `None` only for `Count`.
    pub field: Option<String>,
}

impl Aggregate {
    pub fn count() -> Self {
        Self {
            func: AggregateFunc::Count,
            field: None,
        }
    }

    pub fn new(func: AggregateFunc, field: impl Into<String>) -> Self {
        Self {
            func,
            field: Some(field.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    pub fn as_sql(self) -> &'static str {
        match self {
            AggregateFunc::Count => "COUNT",
            AggregateFunc::Sum => "SUM",
            AggregateFunc::Avg => "AVG",
            AggregateFunc::Min => "MIN",
            AggregateFunc::Max => "MAX",
        }
    }
}

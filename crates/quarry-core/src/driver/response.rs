use crate::stmt::{Record, Value};

#[derive(Debug)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of rows impacted by the operation
    Count(u64),

    /// Operation result, as materialized records. Multi-row reads always
    /// produce this variant, possibly empty, never an error.
    Values(Vec<Record>),

    /// Scalar result of a backend-native aggregation.
    Aggregate(Value),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
        }
    }

    pub fn values(values: Vec<Record>) -> Self {
        Self {
            rows: Rows::Values(values),
        }
    }

    pub fn aggregate(value: Value) -> Self {
        Self {
            rows: Rows::Aggregate(value),
        }
    }

    pub fn empty() -> Self {
        Self::values(Vec::new())
    }

    pub fn into_count(self) -> crate::Result<u64> {
        match self.rows {
            Rows::Count(count) => Ok(count),
            rows => Err(err!("expected a count response; got {rows:?}")),
        }
    }

    pub fn into_values(self) -> crate::Result<Vec<Record>> {
        match self.rows {
            Rows::Values(values) => Ok(values),
            rows => Err(err!("expected a values response; got {rows:?}")),
        }
    }

    pub fn into_aggregate(self) -> crate::Result<Value> {
        match self.rows {
            Rows::Aggregate(value) => Ok(value),
            rows => Err(err!("expected an aggregate response; got {rows:?}")),
        }
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }
}

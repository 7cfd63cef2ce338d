use super::Value;

use serde::{Deserialize, Serialize};

/// A single comparison in a query's filter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub field: String,
    pub op: Op,
    pub value: Value,

    /// How this clause connects to the preceding one. Ignored for the
    /// first clause.
    pub logic: Logic,
}

impl Clause {
    pub fn new(field: impl Into<String>, op: Op, value: impl Into<Value>, logic: Logic) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
            logic,
        }
    }
}

/// Comparison operators supported by both backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
}

impl Op {
    /// The SQL rendering of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Like => "LIKE",
        }
    }
}

impl TryFrom<&str> for Op {
    type Error = crate::Error;

    fn try_from(op: &str) -> crate::Result<Self> {
        Ok(match op {
            "=" | "==" => Op::Eq,
            "!=" | "<>" => Op::Ne,
            ">" => Op::Gt,
            ">=" => Op::Ge,
            "<" => Op::Lt,
            "<=" => Op::Le,
            "like" | "LIKE" => Op::Like,
            _ => return Err(crate::Error::expression(format!("unknown operator `{op}`"))),
        })
    }
}

/// Boolean connective between adjacent clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Logic {
    And,
    Or,
}

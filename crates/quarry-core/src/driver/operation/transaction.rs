use super::Operation;

/// Transaction boundary control.
///
/// Backends without multi-statement transactions accept these as no-ops;
/// the degradation is deliberate and documented on
/// [`Capability::transactions`](crate::driver::Capability).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Start,
    Commit,
    Rollback,
}

impl From<Transaction> for Operation {
    fn from(value: Transaction) -> Self {
        Self::Transaction(value)
    }
}

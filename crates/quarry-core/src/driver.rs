mod capability;
pub use capability::Capability;

pub mod operation;
pub use operation::Operation;

mod response;
pub use response::{Response, Rows};

use crate::async_trait;

use std::fmt::Debug;

/// A backend adapter: the polymorphic capability set selected at
/// configuration time.
///
/// One driver owns the underlying client for one named connection and is
/// shared (via `Arc`) across every builder bound to that connection.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Describes the backend's capabilities, which inform query compilation
    /// and transaction handling.
    fn capability(&self) -> &'static Capability;

    /// Establish the underlying connection. Idempotent: calling this on an
    /// already-connected driver is a no-op.
    async fn connect(&self) -> crate::Result<()>;

    fn is_connected(&self) -> bool;

    /// Execute a database operation.
    async fn exec(&self, op: Operation) -> crate::Result<Response>;
}

mod aggregate;
pub use aggregate::{Aggregate, AggregateFunc};

mod clause;
pub use clause::{Clause, Logic, Op};

mod order_by;
pub use order_by::{Direction, OrderBy};

mod query;
pub use query::{Projection, Query};

mod raw;
pub use raw::{Raw, RawSql};

mod record;
pub use record::Record;

mod value;
pub use value::{Id, Value};

pub mod collection;
pub use collection::Collection;

pub mod db;
pub use db::Db;

mod model;
pub use model::Model;

pub mod query;
pub use query::QueryBuilder;

pub mod relation;
pub use relation::{BelongsTo, HasMany};

pub use quarry_core::{
    driver::{Capability, Driver, Response, Rows},
    schema, stmt, Error, Result,
};
pub use quarry_core::{err, record};

#[cfg(feature = "mongodb")]
pub use quarry_mongodb::MongoDb;
#[cfg(feature = "sqlite")]
pub use quarry_sqlite::Sqlite;

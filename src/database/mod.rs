pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use query_builder::QueryBuilder;
pub use repository::Repository;

use sqlx::{postgres::PgRow, FromRow};

use crate::filter::Filterable;

/// A table-backed row the query builder and repository can load.
pub trait Model: Filterable + for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const TABLE: &'static str;
    /// `ORDER BY` body applied to list queries, if the model has a natural order.
    const DEFAULT_ORDER: Option<&'static str>;
}

pub mod types;
pub mod filter;
pub mod filter_match;
pub mod filter_where;
pub mod error;

pub use types::*;
pub use error::FilterError;
pub use filter::{apply_json_filters, FilterTarget, JsonPredicate};
pub use filter_match::Filterable;

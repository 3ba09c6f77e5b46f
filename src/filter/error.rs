use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid filter: {0}")]
    InvalidSpec(String),

    #[error("Too many filters: {count} (max {max})")]
    TooManyFilters { count: usize, max: usize },
}

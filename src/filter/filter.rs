use super::error::FilterError;
use super::filter_match::{FilterMatch, Filterable};
use super::filter_where::FilterWhere;
use super::types::{Clause, FilterSpec, JsonOp, JsonPath, SqlResult};

/// Conjunction of clauses built from a batch of `FilterSpec`s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonPredicate {
    clauses: Vec<Clause>,
}

impl JsonPredicate {
    /// Fold `filters` into one predicate. `columns` are the scalar columns a key
    /// may address besides `params`.
    pub fn build(filters: &[FilterSpec], columns: &[&str]) -> Result<Self, FilterError> {
        let cfg = &crate::config::CONFIG.filter;
        if filters.len() > cfg.max_filters {
            return Err(FilterError::TooManyFilters { count: filters.len(), max: cfg.max_filters });
        }

        let mut clauses = Vec::with_capacity(filters.len());
        for spec in filters {
            // Reject unknown operators even when the key is malformed.
            let op = JsonOp::parse(spec.operator.as_deref())?;
            let clause = match JsonPath::resolve(&spec.key, columns) {
                Some(path) => Clause::Test { path, op, value: spec.coerced_value() },
                None => Clause::Unsatisfiable,
            };
            if cfg.debug_logging {
                tracing::debug!("json filter {:?} -> {:?}", spec, clause);
            }
            clauses.push(clause);
        }
        Ok(Self { clauses })
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches<R: Filterable>(&self, record: &R) -> bool {
        self.clauses.iter().all(|c| FilterMatch::clause(record, c))
    }

    pub fn to_where_sql(&self, starting_param_index: usize) -> SqlResult {
        let (query, params) = FilterWhere::generate(&self.clauses, starting_param_index);
        SqlResult { query, params }
    }
}

/// A collection a `JsonPredicate` can narrow: an in-memory list or a SQL query.
pub trait FilterTarget: Sized {
    fn filter_columns(&self) -> &'static [&'static str];

    fn apply_predicate(self, predicate: JsonPredicate) -> Self;
}

impl<R: Filterable> FilterTarget for Vec<R> {
    fn filter_columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    fn apply_predicate(mut self, predicate: JsonPredicate) -> Self {
        self.retain(|r| predicate.matches(r));
        self
    }
}

/// Narrow `records` to those matching every spec in `filters`.
///
/// An empty `filters` returns `records` untouched. Missing paths and empty keys
/// never match, however deep the path; values that are not valid JSON compare
/// as strings. Only an unknown operator or more than
/// `filter.max_filters` specs is an error.
pub fn apply_json_filters<Q: FilterTarget>(records: Q, filters: &[FilterSpec]) -> Result<Q, FilterError> {
    if filters.is_empty() { return Ok(records); }
    let predicate = JsonPredicate::build(filters, records.filter_columns())?;
    Ok(records.apply_predicate(predicate))
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::FilterError;

/// One `{key, operator, value}` filter request as received from a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub key: String,
    #[serde(default)]
    pub operator: Option<String>,
    pub value: String,
}

impl FilterSpec {
    pub fn new(key: impl Into<String>, operator: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), operator: Some(operator.into()), value: value.into() }
    }

    pub fn eq(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), operator: None, value: value.into() }
    }

    /// Strict JSON first, raw string otherwise. `"3"` is a number, `"abc"` a string.
    pub fn coerced_value(&self) -> Value {
        serde_json::from_str(&self.value).unwrap_or_else(|_| Value::String(self.value.clone()))
    }
}

impl FromStr for FilterSpec {
    type Err = FilterError;

    /// Parses the CLI shorthand `key:op:value` or `key=value`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        if let (Some(key), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next()) {
            if !key.contains('=') {
                return Ok(Self::new(key, op, value));
            }
        }
        match s.split_once('=') {
            Some((key, value)) => Ok(Self::eq(key, value)),
            None => Err(FilterError::InvalidSpec(format!("expected key:op:value or key=value, got '{}'", s))),
        }
    }
}

/// Comparison operators a `FilterSpec` may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonOp {
    Eq,
    IExact,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    ContainedBy,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    In,
    HasKey,
}

impl JsonOp {
    /// `None`, `""` and `"eq"` all mean plain equality.
    pub fn parse(operator: Option<&str>) -> Result<Self, FilterError> {
        match operator {
            None | Some("") => Ok(JsonOp::Eq),
            Some(op) => op.parse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JsonOp::Eq => "eq",
            JsonOp::IExact => "iexact",
            JsonOp::Gt => "gt",
            JsonOp::Gte => "gte",
            JsonOp::Lt => "lt",
            JsonOp::Lte => "lte",
            JsonOp::Contains => "contains",
            JsonOp::ContainedBy => "contained_by",
            JsonOp::IContains => "icontains",
            JsonOp::StartsWith => "startswith",
            JsonOp::IStartsWith => "istartswith",
            JsonOp::EndsWith => "endswith",
            JsonOp::IEndsWith => "iendswith",
            JsonOp::In => "in",
            JsonOp::HasKey => "has_key",
        }
    }
}

impl FromStr for JsonOp {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "eq" | "exact" => JsonOp::Eq,
            "iexact" => JsonOp::IExact,
            "gt" => JsonOp::Gt,
            "gte" => JsonOp::Gte,
            "lt" => JsonOp::Lt,
            "lte" => JsonOp::Lte,
            "contains" => JsonOp::Contains,
            "contained_by" => JsonOp::ContainedBy,
            "icontains" => JsonOp::IContains,
            "startswith" => JsonOp::StartsWith,
            "istartswith" => JsonOp::IStartsWith,
            "endswith" => JsonOp::EndsWith,
            "iendswith" => JsonOp::IEndsWith,
            "in" => JsonOp::In,
            "has_key" => JsonOp::HasKey,
            other => return Err(FilterError::UnsupportedOperator(other.to_string())),
        })
    }
}

impl fmt::Display for JsonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a path starts: the `params` attribute map or a scalar column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRoot {
    Params,
    Column(String),
}

/// A resolved lookup path, e.g. `params -> a -> b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    pub root: PathRoot,
    pub segments: Vec<String>,
}

impl JsonPath {
    /// Resolve a dotted key. `None` when the key is empty or has an empty segment.
    ///
    /// A leading `params` segment addresses the attribute map explicitly, a leading
    /// segment naming one of `columns` addresses that column, anything else descends
    /// into the attribute map.
    pub fn resolve(key: &str, columns: &[&str]) -> Option<Self> {
        if key.is_empty() { return None; }
        let parts: Vec<&str> = key.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) { return None; }

        let (root, rest) = match parts[0] {
            "params" => (PathRoot::Params, &parts[1..]),
            first if columns.contains(&first) => (PathRoot::Column(first.to_string()), &parts[1..]),
            _ => (PathRoot::Params, &parts[..]),
        };
        Some(Self { root, segments: rest.iter().map(|s| s.to_string()).collect() })
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            PathRoot::Params => f.write_str("params")?,
            PathRoot::Column(c) => f.write_str(c)?,
        }
        for s in &self.segments {
            write!(f, ".{}", s)?;
        }
        Ok(())
    }
}

/// One clause of the conjunction.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Test { path: JsonPath, op: JsonOp, value: Value },
    /// Never matches; produced for malformed keys.
    Unsatisfiable,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

/// Typed bind parameter for the generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Json(Value),
    Int(i64),
}

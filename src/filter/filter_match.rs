use std::cmp::Ordering;

use serde_json::Value;

use super::types::{Clause, JsonOp, JsonPath, PathRoot};

/// Records the JSON filter can evaluate in memory.
pub trait Filterable {
    /// Scalar columns a filter key may address by its first segment.
    const COLUMNS: &'static [&'static str];

    fn params(&self) -> &Value;

    /// Column value as JSON, `None` when the column is SQL NULL or unknown.
    fn column(&self, name: &str) -> Option<Value>;
}

/// In-memory evaluation of clauses, mirroring the PostgreSQL jsonb operators
/// `FilterWhere` emits.
pub struct FilterMatch;

impl FilterMatch {
    pub fn clause<R: Filterable>(record: &R, clause: &Clause) -> bool {
        match clause {
            Clause::Unsatisfiable => false,
            Clause::Test { path, op, value } => match Self::target(record, path) {
                Some(target) => Self::test(*op, &target, value),
                None => false,
            },
        }
    }

    fn target<R: Filterable>(record: &R, path: &JsonPath) -> Option<Value> {
        match &path.root {
            PathRoot::Params => lookup(record.params(), &path.segments).cloned(),
            PathRoot::Column(name) => {
                let column = record.column(name)?;
                lookup(&column, &path.segments).cloned()
            }
        }
    }

    pub fn test(op: JsonOp, target: &Value, value: &Value) -> bool {
        match op {
            JsonOp::Eq => json_eq(target, value),
            JsonOp::IExact => text_test(target, value, |t, v| t.to_lowercase() == v.to_lowercase()),
            JsonOp::Gt => compare_values(target, value) == Some(Ordering::Greater),
            JsonOp::Gte => matches!(compare_values(target, value), Some(Ordering::Greater | Ordering::Equal)),
            JsonOp::Lt => compare_values(target, value) == Some(Ordering::Less),
            JsonOp::Lte => matches!(compare_values(target, value), Some(Ordering::Less | Ordering::Equal)),
            JsonOp::Contains => json_contains(target, value, true),
            JsonOp::ContainedBy => json_contains(value, target, true),
            JsonOp::IContains => text_test(target, value, |t, v| t.to_lowercase().contains(&v.to_lowercase())),
            JsonOp::StartsWith => text_test(target, value, |t, v| t.starts_with(v)),
            JsonOp::IStartsWith => text_test(target, value, |t, v| t.to_lowercase().starts_with(&v.to_lowercase())),
            JsonOp::EndsWith => text_test(target, value, |t, v| t.ends_with(v)),
            JsonOp::IEndsWith => text_test(target, value, |t, v| t.to_lowercase().ends_with(&v.to_lowercase())),
            JsonOp::In => match value {
                Value::Array(items) => items.iter().any(|item| json_eq(target, item)),
                single => json_eq(target, single),
            },
            JsonOp::HasKey => target.as_object().map_or(false, |obj| obj.contains_key(&text_form(value))),
        }
    }
}

/// Walk `segments` from `root`. Objects are indexed by key, arrays by position
/// (negative positions count from the end). Anything else ends the walk.
pub fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let idx: i64 = segment.parse().ok()?;
                let idx = if idx < 0 { items.len() as i64 + idx } else { idx };
                if idx < 0 { return None; }
                items.get(idx as usize)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Text of a filter value as it is bound into SQL: strings unquoted, everything else as JSON.
pub fn text_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text of a stored value as PostgreSQL's `#>>` renders it. JSON null has no
/// text (SQL NULL), so text operators never match it.
pub fn target_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => {
            let mut out = String::new();
            write_jsonb_text(other, &mut out);
            Some(out)
        }
    }
}

fn text_test(target: &Value, value: &Value, test: impl Fn(&str, &str) -> bool) -> bool {
    target_text(target).map_or(false, |t| test(&t, &text_form(value)))
}

/// jsonb output format: `", "` and `": "` separators, object keys ordered by
/// length, then bytewise.
fn write_jsonb_text(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 { out.push_str(", "); }
                write_jsonb_text(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 { out.push_str(", "); }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push_str(": ");
                write_jsonb_text(item, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// JSON equality with numeric comparison for numbers (`5 == 5.0`), never across types.
pub fn json_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(fa), Some(fb)) => fa == fb,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_eq(x, y)),
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).map_or(false, |w| json_eq(v, w)))
        }
        _ => left == right,
    }
}

/// Ordering for same-typed scalars; `None` for anything else.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// jsonb `@>`: does `container` structurally contain `contained`?
fn json_contains(container: &Value, contained: &Value, top_level: bool) -> bool {
    match (container, contained) {
        (Value::Object(c), Value::Object(v)) => {
            v.iter().all(|(k, vv)| c.get(k).map_or(false, |cv| json_contains(cv, vv, false)))
        }
        (Value::Array(c), Value::Array(v)) => v.iter().all(|vv| c.iter().any(|cv| json_contains(cv, vv, false))),
        // A top-level array contains a bare scalar it holds as an element.
        (Value::Array(c), scalar) if top_level && !scalar.is_object() => c.iter().any(|cv| json_eq(cv, scalar)),
        (Value::Array(_), _) | (Value::Object(_), _) | (_, Value::Array(_)) | (_, Value::Object(_)) => false,
        (c, v) => json_eq(c, v),
    }
}

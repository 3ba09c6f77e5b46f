use serde_json::Value;

use super::filter_match::text_form;
use super::types::{Clause, JsonOp, JsonPath, PathRoot, SqlParam};

/// Compiles clauses into a parameterized PostgreSQL `WHERE` fragment.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self { param_values: vec![], param_index: starting_param_index }
    }

    /// Returns the fragment and its parameters, numbered from `starting_param_index + 1`.
    pub fn generate(clauses: &[Clause], starting_param_index: usize) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql = filter_where.build(clauses);
        (sql, filter_where.param_values)
    }

    fn build(&mut self, clauses: &[Clause]) -> String {
        if clauses.is_empty() { return "TRUE".to_string(); }
        clauses
            .iter()
            .map(|c| self.build_sql_condition(c))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn build_sql_condition(&mut self, clause: &Clause) -> String {
        let (path, op, value) = match clause {
            Clause::Unsatisfiable => return "FALSE".to_string(),
            Clause::Test { path, op, value } => (path, *op, value),
        };

        let target = self.target_expr(path);
        let text = format!("({} #>> '{{}}')", target);

        match op {
            JsonOp::Eq => format!("{} = {}", target, self.json(value.clone())),
            JsonOp::IExact => format!("lower({}) = lower({})", text, self.text(text_form(value))),
            JsonOp::Gt => self.ordered(&target, ">", value),
            JsonOp::Gte => self.ordered(&target, ">=", value),
            JsonOp::Lt => self.ordered(&target, "<", value),
            JsonOp::Lte => self.ordered(&target, "<=", value),
            JsonOp::Contains => format!("{} @> {}", target, self.json(value.clone())),
            JsonOp::ContainedBy => format!("{} <@ {}", target, self.json(value.clone())),
            JsonOp::IContains => format!("{} ILIKE {}", text, self.text(format!("%{}%", escape_like(&text_form(value))))),
            JsonOp::StartsWith => format!("{} LIKE {}", text, self.text(format!("{}%", escape_like(&text_form(value))))),
            JsonOp::IStartsWith => format!("{} ILIKE {}", text, self.text(format!("{}%", escape_like(&text_form(value))))),
            JsonOp::EndsWith => format!("{} LIKE {}", text, self.text(format!("%{}", escape_like(&text_form(value))))),
            JsonOp::IEndsWith => format!("{} ILIKE {}", text, self.text(format!("%{}", escape_like(&text_form(value))))),
            JsonOp::In => {
                let items = match value {
                    Value::Array(_) => value.clone(),
                    single => Value::Array(vec![single.clone()]),
                };
                format!(
                    "EXISTS (SELECT 1 FROM jsonb_array_elements({}) AS e(value) WHERE e.value = {})",
                    self.json(items),
                    target
                )
            }
            JsonOp::HasKey => format!(
                "(jsonb_typeof({}) = 'object' AND jsonb_exists({}, {}))",
                target,
                target,
                self.text(text_form(value))
            ),
        }
    }

    /// `params #> ARRAY[$1, $2]::text[]`, or the bare column/params expression.
    fn target_expr(&mut self, path: &JsonPath) -> String {
        let root = match &path.root {
            PathRoot::Params => "\"params\"".to_string(),
            PathRoot::Column(c) => format!("to_jsonb(\"{}\")", c.replace('"', "\"\"")),
        };
        if path.segments.is_empty() { return root; }
        let segments: Vec<String> = path.segments.iter().map(|s| self.text(s.clone())).collect();
        format!("({} #> ARRAY[{}]::text[])", root, segments.join(", "))
    }

    /// jsonb ordering across types is total in PostgreSQL; restrict to same-typed scalars.
    fn ordered(&mut self, target: &str, cmp: &str, value: &Value) -> String {
        let json_type = match value {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            _ => return "FALSE".to_string(),
        };
        format!("(jsonb_typeof({}) = '{}' AND {} {} {})", target, json_type, target, cmp, self.json(value.clone()))
    }

    fn json(&mut self, value: Value) -> String {
        format!("{}::jsonb", self.param(SqlParam::Json(value)))
    }

    fn text(&mut self, value: String) -> String {
        self.param(SqlParam::Text(value))
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Escape `LIKE` metacharacters (backslash is PostgreSQL's default escape).
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') { out.push('\\'); }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test(key: &[&str], op: JsonOp, value: Value) -> Clause {
        Clause::Test {
            path: JsonPath { root: PathRoot::Params, segments: key.iter().map(|s| s.to_string()).collect() },
            op,
            value,
        }
    }

    #[test]
    fn nested_equality_binds_path_and_value() {
        let (sql, params) = FilterWhere::generate(&[test(&["a", "b"], JsonOp::Eq, json!(5))], 0);
        assert_eq!(sql, "(\"params\" #> ARRAY[$1, $2]::text[]) = $3::jsonb");
        assert_eq!(
            params,
            vec![SqlParam::Text("a".into()), SqlParam::Text("b".into()), SqlParam::Json(json!(5))]
        );
    }

    #[test]
    fn numbering_continues_from_start_index() {
        let (sql, params) = FilterWhere::generate(&[test(&["flag"], JsonOp::Eq, json!(true))], 2);
        assert_eq!(sql, "(\"params\" #> ARRAY[$3]::text[]) = $4::jsonb");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn clauses_are_joined_with_and() {
        let clauses = vec![
            Clause::Test {
                path: JsonPath { root: PathRoot::Column("status".into()), segments: vec![] },
                op: JsonOp::Eq,
                value: json!("accept"),
            },
            test(&["priority"], JsonOp::Gte, json!(3)),
        ];
        let (sql, params) = FilterWhere::generate(&clauses, 0);
        assert_eq!(
            sql,
            "to_jsonb(\"status\") = $1::jsonb AND \
             (jsonb_typeof((\"params\" #> ARRAY[$2]::text[])) = 'number' AND (\"params\" #> ARRAY[$2]::text[]) >= $3::jsonb)"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn unsatisfiable_and_non_scalar_ordering_compile_to_false() {
        let (sql, params) = FilterWhere::generate(&[Clause::Unsatisfiable], 0);
        assert_eq!(sql, "FALSE");
        assert!(params.is_empty());

        let (sql, _) = FilterWhere::generate(&[test(&["a"], JsonOp::Gt, json!([1]))], 0);
        assert_eq!(sql, "FALSE");
    }

    #[test]
    fn like_patterns_are_escaped() {
        let (sql, params) = FilterWhere::generate(&[test(&["name"], JsonOp::IContains, json!("50%_off"))], 0);
        assert_eq!(sql, "((\"params\" #> ARRAY[$1]::text[]) #>> '{}') ILIKE $2");
        assert_eq!(params[1], SqlParam::Text("%50\\%\\_off%".into()));
    }

    #[test]
    fn in_wraps_scalars_into_array() {
        let (sql, params) = FilterWhere::generate(&[test(&["tag"], JsonOp::In, json!("x"))], 0);
        assert!(sql.starts_with("EXISTS (SELECT 1 FROM jsonb_array_elements($2::jsonb)"));
        assert_eq!(params[1], SqlParam::Json(json!(["x"])));
    }

    #[test]
    fn whole_attribute_map_has_no_path_params() {
        let (sql, params) = FilterWhere::generate(&[test(&[], JsonOp::Contains, json!({"a": 1}))], 0);
        assert_eq!(sql, "\"params\" @> $1::jsonb");
        assert_eq!(params.len(), 1);
    }
}

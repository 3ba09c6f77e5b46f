use sqlx::{self, postgres::PgArguments, FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::Model;
use crate::filter::filter_where::escape_like;
use crate::filter::{FilterTarget, JsonPredicate, SqlParam, SqlResult};

/// Accumulates `WHERE` conditions for one table and runs the resulting SELECT.
pub struct QueryBuilder<T> {
    conditions: Vec<String>,
    params: Vec<SqlParam>,
    order: Option<String>,
    limit: Option<i64>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Model> QueryBuilder<T> {
    pub fn new() -> Self {
        Self {
            conditions: vec![],
            params: vec![],
            order: T::DEFAULT_ORDER.map(String::from),
            limit: None,
            _phantom: std::marker::PhantomData,
        }
    }

    /// `"column" = $n`
    pub fn where_eq(mut self, column: &str, value: SqlParam) -> Self {
        let p = self.param(value);
        self.conditions.push(format!("{} = {}", quote(column), p));
        self
    }

    /// Case-insensitive substring match on a column
    pub fn where_icontains(mut self, column: &str, needle: &str) -> Self {
        let p = self.param(SqlParam::Text(format!("%{}%", escape_like(needle))));
        self.conditions.push(format!("{} ILIKE {}", quote(column), p));
        self
    }

    /// Case-insensitive substring match against any of `expressions` (raw SQL, trusted).
    pub fn search(mut self, expressions: &[&str], needle: &str) -> Self {
        if expressions.is_empty() { return self; }
        let p = self.param(SqlParam::Text(format!("%{}%", escape_like(needle))));
        let parts: Vec<String> = expressions.iter().map(|e| format!("{} ILIKE {}", e, p)).collect();
        self.conditions.push(format!("({})", parts.join(" OR ")));
        self
    }

    pub fn json_predicate(mut self, predicate: &JsonPredicate) -> Self {
        if predicate.is_empty() { return self; }
        let fragment = predicate.to_where_sql(self.params.len());
        self.params.extend(fragment.params);
        self.conditions.push(fragment.query);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_sql(&self) -> SqlResult {
        let mut query = format!("SELECT * FROM {}", quote(T::TABLE));
        if !self.conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.conditions.join(" AND "));
        }
        if let Some(order) = &self.order {
            query.push_str(" ORDER BY ");
            query.push_str(order);
        }
        if let Some(limit) = self.limit {
            query.push_str(&format!(" LIMIT {}", limit));
        }
        SqlResult { query, params: self.params.clone() }
    }

    pub async fn select_all(self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let sql_result = self.to_sql();
        log_query(&sql_result);
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(pool).await?)
    }

    pub async fn select_optional(self, pool: &PgPool) -> Result<Option<T>, DatabaseError> {
        let sql_result = self.to_sql();
        log_query(&sql_result);
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_optional(pool).await?)
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }
}

impl<T: Model> Default for QueryBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Model> FilterTarget for QueryBuilder<T> {
    fn filter_columns(&self) -> &'static [&'static str] {
        T::COLUMNS
    }

    fn apply_predicate(self, predicate: JsonPredicate) -> Self {
        self.json_predicate(&predicate)
    }
}

pub fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn log_query(sql: &SqlResult) {
    if crate::config::CONFIG.database.enable_query_logging {
        tracing::debug!(params = sql.params.len(), "{}", sql.query);
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        SqlParam::Text(s) => q.bind(s.as_str()),
        SqlParam::Json(j) => q.bind(j.clone()),
        SqlParam::Int(i) => q.bind(*i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Request, User};
    use crate::filter::{apply_json_filters, FilterSpec};

    #[test]
    fn plain_select_uses_default_order() {
        let sql = QueryBuilder::<User>::new().to_sql();
        assert_eq!(sql.query, "SELECT * FROM \"user\" ORDER BY \"username\" ASC");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn scalar_conditions_precede_json_clauses() {
        let qb = QueryBuilder::<Request>::new().where_eq("status", SqlParam::Text("accept".into()));
        let qb = apply_json_filters(qb, &[FilterSpec::new("priority", "gte", "3")]).unwrap();
        let sql = qb.to_sql();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"request\" WHERE \"status\" = $1 AND \
             (jsonb_typeof((\"params\" #> ARRAY[$2]::text[])) = 'number' AND (\"params\" #> ARRAY[$2]::text[]) >= $3::jsonb) \
             ORDER BY \"created_at\" DESC, \"id\" DESC"
        );
        assert_eq!(sql.params.len(), 3);
    }

    #[test]
    fn empty_filters_leave_query_untouched() {
        let qb = apply_json_filters(QueryBuilder::<User>::new().where_icontains("username", "an"), &[]).unwrap();
        let sql = qb.to_sql();
        assert_eq!(sql.query, "SELECT * FROM \"user\" WHERE \"username\" ILIKE $1 ORDER BY \"username\" ASC");
        assert_eq!(sql.params, vec![SqlParam::Text("%an%".into())]);
    }

    #[test]
    fn search_reuses_one_parameter() {
        let sql = QueryBuilder::<User>::new().search(&["\"username\"", "\"email\""], "a_b").limit(5).to_sql();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"user\" WHERE (\"username\" ILIKE $1 OR \"email\" ILIKE $1) ORDER BY \"username\" ASC LIMIT 5"
        );
        assert_eq!(sql.params, vec![SqlParam::Text("%a\\_b%".into())]);
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote("user"), "\"user\"");
        assert_eq!(quote("we\"ird"), "\"we\"\"ird\"");
    }
}

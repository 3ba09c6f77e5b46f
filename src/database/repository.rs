use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::{quote, QueryBuilder};
use crate::database::Model;
use crate::filter::SqlParam;

/// Table-level reads and deletes shared by every model.
pub struct Repository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Model> Repository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, _phantom: std::marker::PhantomData }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn select_any(&self, query: QueryBuilder<T>) -> Result<Vec<T>, DatabaseError> {
        query.select_all(&self.pool).await
    }

    pub async fn select_one(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        QueryBuilder::<T>::new()
            .where_eq("id", SqlParam::Int(id))
            .select_optional(&self.pool)
            .await
    }

    /// Delete by id; returns the number of rows removed (0 or 1).
    pub async fn delete_id(&self, id: i64) -> Result<u64, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE \"id\" = $1", quote(T::TABLE));
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

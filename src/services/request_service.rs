use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{InvalidStatus, Request, RequestStatus};
use crate::database::{QueryBuilder, Repository};
use crate::filter::{apply_json_filters, FilterError, FilterSpec, SqlParam};
use crate::services::user_service::is_foreign_key_violation;

/// Arguments of the `requests` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestsQuery {
    /// Exact status match
    pub status: Option<String>,
    /// Admin-style search across text, params and the owner's username
    pub search: Option<String>,
    pub params_filter: Option<Vec<FilterSpec>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRequest {
    pub user_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub params: Option<Value>,
    pub text: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequest {
    pub params: Option<Value>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResult {
    pub ok: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Status(#[from] InvalidStatus),
    #[error("Request {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    Invalid(String),
}

impl From<sqlx::Error> for RequestError {
    fn from(err: sqlx::Error) -> Self {
        RequestError::Database(DatabaseError::Sqlx(err))
    }
}

const SEARCH_FIELDS: &[&str] = &[
    "\"text\"",
    "\"params\"::text",
    "(SELECT u.\"username\" FROM \"user\" u WHERE u.\"id\" = \"request\".\"user_id\")",
];

pub struct RequestService {
    repo: Repository<Request>,
}

impl RequestService {
    pub fn new(pool: PgPool) -> Self {
        Self { repo: Repository::new(pool) }
    }

    pub async fn connect() -> Result<Self, RequestError> {
        Ok(Self::new(DatabaseManager::pool().await?))
    }

    /// Translate query arguments into SQL without touching the database.
    pub fn build_query(query: &RequestsQuery) -> Result<QueryBuilder<Request>, RequestError> {
        let mut qb = QueryBuilder::<Request>::new();
        if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
            let status: RequestStatus = status.parse()?;
            qb = qb.where_eq("status", SqlParam::Text(status.as_str().to_string()));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            qb = qb.search(SEARCH_FIELDS, search);
        }
        let filters = query.params_filter.as_deref().unwrap_or_default();
        Ok(apply_json_filters(qb, filters)?)
    }

    pub async fn requests(&self, query: &RequestsQuery) -> Result<Vec<Request>, RequestError> {
        self.find(Self::build_query(query)?).await
    }

    pub async fn find(&self, query: QueryBuilder<Request>) -> Result<Vec<Request>, RequestError> {
        Ok(self.repo.select_any(query).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Request, RequestError> {
        self.repo.select_one(id).await?.ok_or(RequestError::NotFound(id))
    }

    pub async fn create_request(&self, input: CreateRequest) -> Result<Request, RequestError> {
        let status = Self::validate_create(&input)?;
        let result = sqlx::query_as::<_, Request>(
            "INSERT INTO \"request\" (\"user_id\", \"parent_id\", \"params\", \"text\", \"status\") \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(input.user_id)
        .bind(input.parent_id)
        .bind(input.params.unwrap_or_else(|| json!({})))
        .bind(input.text.unwrap_or_default())
        .bind(status.as_str())
        .fetch_one(self.repo.pool())
        .await;

        match result {
            Ok(request) => {
                info!("Created request {}", request);
                Ok(request)
            }
            Err(e) if is_foreign_key_violation(&e) => {
                Err(RequestError::Invalid("Referenced user or parent request does not exist".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_request(&self, id: i64, input: UpdateRequest) -> Result<Request, RequestError> {
        let status = Self::validate_update(&input)?;
        let request = sqlx::query_as::<_, Request>(
            "UPDATE \"request\" SET \
                \"params\" = COALESCE($2, \"params\"), \
                \"status\" = COALESCE($3, \"status\"), \
                \"updated_at\" = now() \
             WHERE \"id\" = $1 RETURNING *",
        )
        .bind(id)
        .bind(input.params)
        .bind(status.map(|s| s.as_str()))
        .fetch_optional(self.repo.pool())
        .await?
        .ok_or(RequestError::NotFound(id))?;

        info!("Updated request {}", request);
        Ok(request)
    }

    /// Deleting an id that does not exist still succeeds.
    pub async fn delete_request(&self, id: i64) -> Result<DeleteResult, RequestError> {
        let removed = self.repo.delete_id(id).await?;
        info!("Deleted request {} ({} row(s))", id, removed);
        Ok(DeleteResult { ok: true })
    }

    /// Returns the status to store; `processed` when none is given.
    pub fn validate_create(input: &CreateRequest) -> Result<RequestStatus, RequestError> {
        Self::validate_params(input.params.as_ref())?;
        match input.status.as_deref() {
            None => Ok(RequestStatus::default()),
            Some(s) => Ok(s.parse()?),
        }
    }

    pub fn validate_update(input: &UpdateRequest) -> Result<Option<RequestStatus>, RequestError> {
        Self::validate_params(input.params.as_ref())?;
        Ok(input.status.as_deref().map(str::parse::<RequestStatus>).transpose()?)
    }

    fn validate_params(params: Option<&Value>) -> Result<(), RequestError> {
        match params {
            None | Some(Value::Object(_)) => Ok(()),
            Some(_) => Err(RequestError::Invalid("params must be a JSON object".to_string())),
        }
    }
}

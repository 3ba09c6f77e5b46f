use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;

use crate::auth::{hash_password, PasswordError};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::User;
use crate::database::{QueryBuilder, Repository};
use crate::filter::{apply_json_filters, FilterError, FilterSpec};

/// Arguments of the `users` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersQuery {
    /// Case-insensitive substring of the username
    pub username: Option<String>,
    /// Admin-style search across username, email and names
    pub search: Option<String>,
    pub params_filter: Option<Vec<FilterSpec>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub params: Option<Value>,
    pub max_daily_requests: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub params: Option<Value>,
    pub max_daily_requests: Option<i32>,
}

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("User already exists: {0}")]
    AlreadyExists(String),
    #[error("User {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    Invalid(String),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        UserError::Database(DatabaseError::Sqlx(err))
    }
}

const SEARCH_FIELDS: &[&str] = &["\"username\"", "\"email\"", "\"first_name\"", "\"last_name\""];

pub struct UserService {
    repo: Repository<User>,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { repo: Repository::new(pool) }
    }

    pub async fn connect() -> Result<Self, UserError> {
        Ok(Self::new(DatabaseManager::pool().await?))
    }

    /// Translate query arguments into SQL without touching the database.
    pub fn build_query(query: &UsersQuery) -> Result<QueryBuilder<User>, UserError> {
        let mut qb = QueryBuilder::<User>::new();
        if let Some(username) = query.username.as_deref().filter(|s| !s.is_empty()) {
            qb = qb.where_icontains("username", username);
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            qb = qb.search(SEARCH_FIELDS, search);
        }
        let filters = query.params_filter.as_deref().unwrap_or_default();
        Ok(apply_json_filters(qb, filters)?)
    }

    pub async fn users(&self, query: &UsersQuery) -> Result<Vec<User>, UserError> {
        self.find(Self::build_query(query)?).await
    }

    pub async fn find(&self, query: QueryBuilder<User>) -> Result<Vec<User>, UserError> {
        Ok(self.repo.select_any(query).await?)
    }

    pub async fn get(&self, id: i64) -> Result<User, UserError> {
        self.repo.select_one(id).await?.ok_or(UserError::NotFound(id))
    }

    pub async fn exists(&self, username: &str) -> Result<bool, UserError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM \"user\" WHERE \"username\" = $1")
            .bind(username)
            .fetch_one(self.repo.pool())
            .await?;
        Ok(count.0 > 0)
    }

    pub async fn create_user(&self, input: CreateUser) -> Result<User, UserError> {
        Self::validate_create(&input)?;
        self.insert(&input.username, &input.password, "", false, input.params, input.max_daily_requests).await
    }

    /// Active staff superuser, as created by `ais init-admin`.
    pub async fn create_superuser(&self, username: &str, email: &str, password: &str) -> Result<User, UserError> {
        Self::validate_username(username)?;
        self.insert(username, password, email, true, None, None).await
    }

    pub async fn update_user(&self, id: i64, input: UpdateUser) -> Result<User, UserError> {
        Self::validate_params(input.params.as_ref())?;
        let user = sqlx::query_as::<_, User>(
            "UPDATE \"user\" SET \
                \"params\" = COALESCE($2, \"params\"), \
                \"max_daily_requests\" = COALESCE($3, \"max_daily_requests\") \
             WHERE \"id\" = $1 RETURNING *",
        )
        .bind(id)
        .bind(input.params)
        .bind(input.max_daily_requests)
        .fetch_optional(self.repo.pool())
        .await?
        .ok_or(UserError::NotFound(id))?;

        info!("Updated user {}", user.username);
        Ok(user)
    }

    async fn insert(
        &self,
        username: &str,
        password: &str,
        email: &str,
        superuser: bool,
        params: Option<Value>,
        max_daily_requests: Option<i32>,
    ) -> Result<User, UserError> {
        let iterations = crate::config::CONFIG.security.password_iterations;
        let hashed = hash_password(password, iterations)?;

        let result = sqlx::query_as::<_, User>(
            "INSERT INTO \"user\" \
                (\"username\", \"password\", \"email\", \"is_staff\", \"is_superuser\", \"params\", \"max_daily_requests\") \
             VALUES ($1, $2, $3, $4, $4, $5, $6) RETURNING *",
        )
        .bind(username)
        .bind(hashed)
        .bind(email)
        .bind(superuser)
        .bind(params.unwrap_or_else(|| json!({})))
        .bind(max_daily_requests)
        .fetch_one(self.repo.pool())
        .await;

        match result {
            Ok(user) => {
                info!("Created user {} (superuser: {})", user.username, superuser);
                Ok(user)
            }
            Err(e) if is_unique_violation(&e) => Err(UserError::AlreadyExists(username.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate_create(input: &CreateUser) -> Result<(), UserError> {
        Self::validate_username(&input.username)?;
        if input.password.is_empty() {
            return Err(UserError::Invalid("Password must not be empty".to_string()));
        }
        Self::validate_params(input.params.as_ref())
    }

    /// Letters, digits and `@.+-_`, at most 150 characters.
    fn validate_username(username: &str) -> Result<(), UserError> {
        if username.is_empty() {
            return Err(UserError::Invalid("Username must not be empty".to_string()));
        }
        if username.chars().count() > 150 {
            return Err(UserError::Invalid("Username must be at most 150 characters".to_string()));
        }
        if !username.chars().all(|c| c.is_alphanumeric() || "@.+-_".contains(c)) {
            return Err(UserError::Invalid(
                "Username may only contain letters, digits and @/./+/-/_".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_params(params: Option<&Value>) -> Result<(), UserError> {
        match params {
            None | Some(Value::Object(_)) => Ok(()),
            Some(_) => Err(UserError::Invalid("params must be a JSON object".to_string())),
        }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error().and_then(|d| d.code()).as_deref() == Some("23505")
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error().and_then(|d| d.code()).as_deref() == Some("23503")
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::FromRow;

use crate::database::Model;
use crate::filter::Filterable;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    #[serde(skip_serializing)]
    pub password: String,
    pub last_login: Option<DateTime<Utc>>,
    pub is_superuser: bool,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub params: Value,
    pub max_daily_requests: Option<i32>,
}

impl Model for User {
    const TABLE: &'static str = "user";
    const DEFAULT_ORDER: Option<&'static str> = Some("\"username\" ASC");
}

impl Filterable for User {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "username",
        "email",
        "first_name",
        "last_name",
        "max_daily_requests",
        "is_active",
        "is_staff",
        "is_superuser",
    ];

    fn params(&self) -> &Value {
        &self.params
    }

    fn column(&self, name: &str) -> Option<Value> {
        Some(match name {
            "id" => json!(self.id),
            "username" => json!(self.username),
            "email" => json!(self.email),
            "first_name" => json!(self.first_name),
            "last_name" => json!(self.last_name),
            "max_daily_requests" => json!(self.max_daily_requests?),
            "is_active" => json!(self.is_active),
            "is_staff" => json!(self.is_staff),
            "is_superuser" => json!(self.is_superuser),
            _ => return None,
        })
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.username)
    }
}

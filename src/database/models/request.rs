use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use thiserror::Error;

use crate::database::Model;
use crate::filter::Filterable;

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Invalid request status '{0}' (expected processed, await, accept or reject)")]
pub struct InvalidStatus(pub String);

/// Lifecycle of a request as shown to operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Under review
    #[default]
    Processed,
    /// Sent back for rework
    Await,
    /// Completed
    Accept,
    /// Refused
    Reject,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] =
        [RequestStatus::Processed, RequestStatus::Await, RequestStatus::Accept, RequestStatus::Reject];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Processed => "processed",
            RequestStatus::Await => "await",
            RequestStatus::Accept => "accept",
            RequestStatus::Reject => "reject",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Processed => "Under review",
            RequestStatus::Await => "Rework",
            RequestStatus::Accept => "Completed",
            RequestStatus::Reject => "Rejected",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = InvalidStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Request {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub user_id: Option<i64>,
    pub params: Value,
    pub text: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model for Request {
    const TABLE: &'static str = "request";
    const DEFAULT_ORDER: Option<&'static str> = Some("\"created_at\" DESC, \"id\" DESC");
}

impl Filterable for Request {
    const COLUMNS: &'static [&'static str] = &["id", "parent_id", "user_id", "text", "status"];

    fn params(&self) -> &Value {
        &self.params
    }

    fn column(&self, name: &str) -> Option<Value> {
        Some(match name {
            "id" => json!(self.id),
            "parent_id" => json!(self.parent_id?),
            "user_id" => json!(self.user_id?),
            "text" => json!(self.text.as_ref()?),
            "status" => json!(self.status.as_str()),
            _ => return None,
        })
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} | {}", self.id, self.status.label())
    }
}

use serde_json::{json, Value};

use crate::filter::Filterable;

/// Minimal in-memory record for exercising the JSON filter without a database.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    pub id: i64,
    pub status: String,
    pub params: Value,
}

impl TestRecord {
    pub fn new(id: i64, status: &str, params: Value) -> Self {
        Self { id, status: status.to_string(), params }
    }
}

impl Filterable for TestRecord {
    const COLUMNS: &'static [&'static str] = &["id", "status"];

    fn params(&self) -> &Value {
        &self.params
    }

    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(json!(self.id)),
            "status" => Some(json!(self.status)),
            _ => None,
        }
    }
}

/// A small request log with a mix of statuses, priorities and tags, ordered by id.
pub fn sample_requests() -> Vec<TestRecord> {
    vec![
        TestRecord::new(1, "accept", json!({"priority": 5, "city": "Kazan", "tags": ["urgent"]})),
        TestRecord::new(2, "accept", json!({"priority": 1, "city": "Kazan", "tags": []})),
        TestRecord::new(3, "reject", json!({"priority": 4, "city": "Perm", "tags": ["urgent", "vip"]})),
        TestRecord::new(4, "processed", json!({"priority": "3", "city": "Omsk"})),
        TestRecord::new(5, "accept", json!({"priority": 3, "tags": ["urgent", "vip"], "meta": {"source": "web"}})),
        TestRecord::new(6, "await", json!({})),
        TestRecord::new(7, "accept", json!({"priority": 2.5, "city": "Perm", "tags": ["vip"]})),
        TestRecord::new(8, "accept", json!({"priority": 9, "meta": {"source": "mail"}})),
    ]
}

pub fn ids(records: &[TestRecord]) -> Vec<i64> {
    records.iter().map(|r| r.id).collect()
}

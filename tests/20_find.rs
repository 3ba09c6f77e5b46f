mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

// Creates one user with a handful of requests, then filters them through
// /api/find/requests. Every filter includes the run tag so rows from other
// runs never leak into the assertions.

struct Fixture {
    tag: String,
    user_id: i64,
    /// ids in creation order: a, b, c, d
    requests: Vec<i64>,
}

async fn fixture(server: &common::TestServer) -> Result<Fixture> {
    let tag = common::unique("run");
    let (status, user) = common::post(
        server,
        "/api/users",
        json!({"username": common::unique("finder"), "password": "secret", "params": {"department": "support"}}),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "create user failed: {}", user);
    let user_id = user["data"]["id"].as_i64().unwrap();

    let bodies = [
        json!({"user_id": user_id, "status": "accept", "text": "alpha", "params": {"tag": tag, "priority": 5, "a": {"b": 5}, "flag": true}}),
        json!({"user_id": user_id, "status": "accept", "text": "beta", "params": {"tag": tag, "priority": 1, "a": {"b": "5"}, "flag": "true"}}),
        json!({"user_id": user_id, "status": "reject", "text": "gamma", "params": {"tag": tag, "priority": 9, "note": "not-json{"}}),
        json!({"user_id": user_id, "text": "delta", "params": {"tag": tag, "labels": ["x", "y"]}}),
    ];

    let mut requests = vec![];
    for body in bodies {
        let (status, created) = common::post(server, "/api/requests", body).await?;
        assert_eq!(status, StatusCode::CREATED, "create request failed: {}", created);
        requests.push(created["data"]["id"].as_i64().unwrap());
    }

    Ok(Fixture { tag, user_id, requests })
}

fn tagged(fx: &Fixture, extra: serde_json::Value) -> serde_json::Value {
    let mut filters = vec![json!({"key": "tag", "value": fx.tag})];
    if let Some(more) = extra.as_array() {
        filters.extend(more.iter().cloned());
    }
    json!(filters)
}

#[tokio::test]
async fn filters_requests_by_params() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let fx = fixture(server).await?;
    let [a, b, c, d] = [fx.requests[0], fx.requests[1], fx.requests[2], fx.requests[3]];

    // Only the tag: all four, newest first
    let (status, payload) = common::post(server, "/api/find/requests", json!({"params_filter": tagged(&fx, json!([]))})).await?;
    assert_eq!(status, StatusCode::OK, "{}", payload);
    assert_eq!(common::ids(&payload), vec![d, c, b, a]);

    // Nested path with numeric coercion: 5 matches, "5" does not
    let body = json!({"params_filter": tagged(&fx, json!([{"key": "params.a.b", "operator": "eq", "value": "5"}]))});
    let (_, payload) = common::post(server, "/api/find/requests", body).await?;
    assert_eq!(common::ids(&payload), vec![a]);

    // Boolean coercion
    let body = json!({"params_filter": tagged(&fx, json!([{"key": "flag", "value": "true"}]))});
    let (_, payload) = common::post(server, "/api/find/requests", body).await?;
    assert_eq!(common::ids(&payload), vec![a]);

    // Malformed JSON value falls back to a string
    let body = json!({"params_filter": tagged(&fx, json!([{"key": "note", "value": "not-json{"}]))});
    let (status, payload) = common::post(server, "/api/find/requests", body).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(common::ids(&payload), vec![c]);

    // Missing path never matches
    let body = json!({"params_filter": tagged(&fx, json!([{"key": "missing.deeper", "value": "1"}]))});
    let (status, payload) = common::post(server, "/api/find/requests", body).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(common::ids(&payload).is_empty());

    // Column and params clauses combine with AND, in any order
    let clauses = json!([
        {"key": "status", "value": "accept"},
        {"key": "params.priority", "operator": "gte", "value": "3"}
    ]);
    let (_, forward) = common::post(server, "/api/find/requests", json!({"params_filter": tagged(&fx, clauses.clone())})).await?;
    let reversed: Vec<_> = clauses.as_array().unwrap().iter().rev().cloned().collect();
    let (_, backward) = common::post(server, "/api/find/requests", json!({"params_filter": tagged(&fx, json!(reversed))})).await?;
    assert_eq!(common::ids(&forward), vec![a]);
    assert_eq!(common::ids(&forward), common::ids(&backward));

    // Array containment
    let body = json!({"params_filter": tagged(&fx, json!([{"key": "labels", "operator": "contains", "value": "[\"y\"]"}]))});
    let (_, payload) = common::post(server, "/api/find/requests", body).await?;
    assert_eq!(common::ids(&payload), vec![d]);

    // Plain status argument with a params filter
    let body = json!({"status": "reject", "params_filter": tagged(&fx, json!([]))});
    let (_, payload) = common::post(server, "/api/find/requests", body).await?;
    assert_eq!(common::ids(&payload), vec![c]);

    // Status defaults to processed
    let body = json!({"status": "processed", "params_filter": tagged(&fx, json!([]))});
    let (_, payload) = common::post(server, "/api/find/requests", body).await?;
    assert_eq!(common::ids(&payload), vec![d]);

    Ok(())
}

#[tokio::test]
async fn filters_users_by_params() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let fx = fixture(server).await?;

    let (_, payload) = common::post(
        server,
        "/api/find/users",
        json!({"params_filter": [
            {"key": "id", "value": fx.user_id.to_string()},
            {"key": "department", "operator": "istartswith", "value": "SUP"}
        ]}),
    )
    .await?;
    assert_eq!(common::ids(&payload), vec![fx.user_id]);
    assert!(payload["data"][0].get("password").is_none(), "password leaked: {}", payload);

    Ok(())
}

#[tokio::test]
async fn unsupported_operator_is_a_bad_request() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };

    let body = json!({"params_filter": [{"key": "priority", "operator": "regex", "value": "."}]});
    let (status, payload) = common::post(server, "/api/find/requests", body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["code"], "BAD_REQUEST");

    Ok(())
}

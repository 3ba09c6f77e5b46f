mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn request_lifecycle() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let (status, created) = common::post(server, "/api/requests", json!({"text": "hello", "params": {"n": 1}})).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["data"]["status"], "processed");
    let id = created["data"]["id"].as_i64().unwrap();

    let res = client
        .patch(format!("{}/api/requests/{}", server.base_url, id))
        .json(&json!({"status": "accept", "params": {"n": 2}}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = res.json::<serde_json::Value>().await?;
    assert_eq!(updated["data"]["status"], "accept");
    assert_eq!(updated["data"]["params"], json!({"n": 2}));
    assert_eq!(updated["data"]["text"], "hello");

    // Delete twice: both succeed
    for _ in 0..2 {
        let res = client.delete(format!("{}/api/requests/{}", server.base_url, id)).send().await?;
        assert_eq!(res.status(), StatusCode::OK);
        let payload = res.json::<serde_json::Value>().await?;
        assert_eq!(payload["data"], json!({"ok": true}));
    }

    let res = client.get(format!("{}/api/requests/{}", server.base_url, id)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .patch(format!("{}/api/requests/{}", server.base_url, id))
        .json(&json!({"status": "reject"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn user_updates_and_conflicts() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();
    let username = common::unique("mutant");

    let (status, created) = common::post(server, "/api/users", json!({"username": username, "password": "pw"})).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["data"]["params"], json!({}));
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, payload) = common::post(server, "/api/users", json!({"username": username, "password": "pw"})).await?;
    assert_eq!(status, StatusCode::CONFLICT, "{}", payload);

    let res = client
        .patch(format!("{}/api/users/{}", server.base_url, id))
        .json(&json!({"max_daily_requests": 10}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = res.json::<serde_json::Value>().await?;
    assert_eq!(updated["data"]["max_daily_requests"], 10);

    let res = client
        .patch(format!("{}/api/users/{}", server.base_url, i64::MAX))
        .json(&json!({"params": {"x": 1}}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Document endpoint tests: add, delete and count

use axum::http::StatusCode;
use rag_ml_service::api::create_app;
use serde_json::{json, Value};

use super::mock_models::{send, setup_failing_app, setup_test_app, setup_test_state};

async fn count(app: &axum::Router) -> u64 {
    let (status, body) = send(app, "GET", "/documents/count", None).await;
    assert_eq!(status, StatusCode::OK);
    body["count"].as_u64().unwrap()
}

fn docs(items: &[(&str, &str)]) -> Value {
    json!({
        "documents": items
            .iter()
            .map(|(id, text)| json!({"id": id, "text": text, "metadata": {"source": "wire"}}))
            .collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn test_add_increases_count() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_test_app(dir.path()).await;
    assert_eq!(count(&app).await, 0);

    let (status, body) = send(
        &app,
        "POST",
        "/documents/add",
        Some(docs(&[("a", "cats are pets"), ("b", "dogs are pets")])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "count": 2}));
    assert_eq!(count(&app).await, 2);
}

#[tokio::test]
async fn test_readding_id_is_upsert() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_test_app(dir.path()).await;

    send(&app, "POST", "/documents/add", Some(docs(&[("a", "first version")]))).await;
    let (status, body) = send(
        &app,
        "POST",
        "/documents/add",
        Some(docs(&[("a", "second version"), ("c", "another story")])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(count(&app).await, 2);

    // The replacement text is what search sees
    let (_, body) = send(&app, "POST", "/search", Some(json!({"query": "second version", "top_k": 1}))).await;
    assert_eq!(body["results"][0]["id"], "a");
    assert_eq!(body["results"][0]["text"], "second version");
}

#[tokio::test]
async fn test_duplicate_ids_in_one_request_fail_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_test_app(dir.path()).await;

    let (status, body) = send(
        &app,
        "POST",
        "/documents/add",
        Some(docs(&[("x", "one"), ("y", "two"), ("x", "three")])),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_type"], "internal_error");
    assert_eq!(count(&app).await, 0);
}

#[tokio::test]
async fn test_metadata_is_optional_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_test_app(dir.path()).await;

    let request = json!({"documents": [
        {"id": "m1", "text": "budget talks stall", "metadata": {"source": "wire", "year": 2024}},
        {"id": "m2", "text": "budget vote passes"}
    ]});
    let (status, _) = send(&app, "POST", "/documents/add", Some(request)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "POST", "/search", Some(json!({"query": "budget talks stall"}))).await;
    let results = body["results"].as_array().unwrap();
    let m1 = results.iter().find(|r| r["id"] == "m1").unwrap();
    let m2 = results.iter().find(|r| r["id"] == "m2").unwrap();
    assert_eq!(m1["metadata"], json!({"source": "wire", "year": 2024}));
    assert_eq!(m2["metadata"], json!({}));
}

#[tokio::test]
async fn test_empty_add_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_test_app(dir.path()).await;

    let (status, body) = send(&app, "POST", "/documents/add", Some(json!({"documents": []}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_delete_reduces_count_by_existing_ids() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_test_app(dir.path()).await;

    send(
        &app,
        "POST",
        "/documents/add",
        Some(docs(&[("a", "one"), ("b", "two"), ("c", "three")])),
    )
    .await;

    let (status, body) =
        send(&app, "DELETE", "/documents", Some(json!({"ids": ["a", "missing", "c"]}))).await;
    assert_eq!(status, StatusCode::OK);
    // Reported count is the number of ids requested
    assert_eq!(body, json!({"status": "success", "count": 3}));
    assert_eq!(count(&app).await, 1);
}

#[tokio::test]
async fn test_delete_unknown_ids_is_silent() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_test_app(dir.path()).await;

    let (status, body) = send(&app, "DELETE", "/documents", Some(json!({"ids": ["nope"]}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(count(&app).await, 0);
}

#[tokio::test]
async fn test_documents_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let app = setup_test_app(dir.path()).await;
        send(&app, "POST", "/documents/add", Some(docs(&[("a", "kept"), ("b", "also kept")]))).await;
    }

    let app = setup_test_app(dir.path()).await;
    assert_eq!(count(&app).await, 2);
}

#[tokio::test]
async fn test_embedding_failure_adds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_failing_app(dir.path()).await;

    let (status, body) = send(&app, "POST", "/documents/add", Some(docs(&[("a", "text")]))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_type"], "internal_error");
    assert_eq!(count(&app).await, 0);
}

#[tokio::test]
async fn test_multi_megabyte_batch_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_test_app(dir.path()).await;

    // 200 full-length articles, about 3 MB of JSON
    let article = "markets rally as investors weigh earnings ".repeat(400);
    let items: Vec<(String, String)> = (0..200)
        .map(|i| (format!("article-{}", i), format!("{} {}", i, article)))
        .collect();
    let borrowed: Vec<(&str, &str)> = items.iter().map(|(id, text)| (id.as_str(), text.as_str())).collect();
    let body = docs(&borrowed);
    assert!(body.to_string().len() > 3_000_000);

    let (status, response) = send(&app, "POST", "/documents/add", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["count"], 200);
    assert_eq!(count(&app).await, 200);
}

#[tokio::test]
async fn test_body_over_limit_is_413() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(setup_test_state(dir.path()).await.with_body_limit(1024));

    let text = "x".repeat(4096);
    let (status, body) = send(&app, "POST", "/documents/add", Some(docs(&[("big", text.as_str())]))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error_type"], "payload_too_large");
    assert_eq!(count(&app).await, 0);
}

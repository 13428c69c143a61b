//! Integration tests for the HTTP API
//!
//! Requests go through the full router (tracing and CORS layers included)
//! against a memory-backed tracker.

mod helpers;

use axum::http::StatusCode;
use helpers::{send, test_router};
use serde_json::{json, Value};

fn record_body(material_type: &str, weight_kg: f64) -> serde_json::Value {
    json!({
        "material_type": material_type,
        "weight_kg": weight_kg,
        "registered_by": "Rosa",
        "registered_at": "2024-03-01T09:30:00",
    })
}

#[tokio::test]
async fn test_health_check() {
    let (router, _worker) = test_router().await;

    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn test_register_group_dispatch_history() {
    let (router, _worker) = test_router().await;

    let (status, body) = send(&router, "POST", "/api/records", Some(record_body("Plastic", 2.5))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["state"], "Active");

    send(&router, "POST", "/api/records", Some(record_body("Glass", 3.2))).await;
    send(&router, "POST", "/api/records", Some(record_body("plástico", 23.0))).await;

    let (status, body) = send(&router, "GET", "/api/groups", None).await;
    assert_eq!(status, StatusCode::OK);
    let groups = body["data"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["material_type"], "Plastic");
    assert_eq!(groups[0]["count"], 2);
    assert_eq!(groups[0]["total_weight_kg"], 25.5);
    assert_eq!(groups[0]["record_ids"], json!([1, 3]));

    let (status, body) = send(
        &router,
        "POST",
        "/api/dispatches",
        Some(json!({
            "selection": [{ "material_type": "Plastic", "record_ids": [1, 3] }],
            "authorized_by": "Supervisor",
            "dispatched_at": "2024-03-05T16:00:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["batch"]["dispatch_id"], 1);
    assert_eq!(body["data"]["batch"]["record_count"], 2);

    let (_, body) = send(&router, "GET", "/api/dispatches", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = send(&router, "GET", "/api/records?state=Dispatched", None).await;
    assert_eq!(body["count"], 2);

    let (_, body) = send(&router, "GET", "/api/stats", None).await;
    assert_eq!(body["data"]["active_records"], 1);
    assert_eq!(body["data"]["dispatch_count"], 1);
}

#[tokio::test]
async fn test_invalid_registration_is_422_with_fields() {
    let (router, _worker) = test_router().await;

    let (status, body) = send(
        &router,
        "POST",
        "/api/records",
        Some(json!({ "material_type": "", "weight_kg": 0, "registered_by": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "validation");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|field| field["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["material_type", "weight_kg", "registered_by"]);
}

#[tokio::test]
async fn test_missing_registration_fields_are_422() {
    let (router, _worker) = test_router().await;

    let field_names = |body: &Value| -> Vec<String> {
        body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|field| field["field"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, body) = send(&router, "POST", "/api/records", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
    assert_eq!(field_names(&body), vec!["material_type", "weight_kg", "registered_by"]);

    let (status, body) = send(
        &router,
        "POST",
        "/api/records",
        Some(json!({ "material_type": "Glass", "weight_kg": 2.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(field_names(&body), vec!["registered_by"]);

    let (_, body) = send(&router, "GET", "/api/stats", None).await;
    assert_eq!(body["data"]["total_records"], 0);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let (router, _worker) = test_router().await;

    let (status, body) = send(&router, "POST", "/api/records", Some(json!({ "weight_kg": "heavy" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_request");
}

#[tokio::test]
async fn test_empty_dispatch_is_409() {
    let (router, _worker) = test_router().await;
    send(&router, "POST", "/api/records", Some(record_body("Metal", 1.0))).await;

    let dispatch = json!({
        "selection": [{ "material_type": "Metal", "record_ids": [1] }],
        "authorized_by": "Supervisor",
    });
    let (status, _) = send(&router, "POST", "/api/dispatches", Some(dispatch.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&router, "POST", "/api/dispatches", Some(dispatch)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "nothing_to_dispatch");
    assert_eq!(body["details"]["skipped"][0]["record_id"], 1);
    assert_eq!(body["details"]["skipped"][0]["reason"], "already_dispatched");

    let (_, body) = send(&router, "GET", "/api/dispatches", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_partial_dispatch_reports_skipped() {
    let (router, _worker) = test_router().await;
    send(&router, "POST", "/api/records", Some(record_body("Glass", 1.0))).await;

    let (status, body) = send(
        &router,
        "POST",
        "/api/dispatches",
        Some(json!({
            "selection": [{ "material_type": "Glass", "record_ids": [1, 8] }],
            "authorized_by": "Supervisor",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "partial");
    assert_eq!(body["data"]["skipped"][0]["reason"], "not_found");
}

#[tokio::test]
async fn test_missing_selection_is_422() {
    let (router, _worker) = test_router().await;

    let (status, body) = send(
        &router,
        "POST",
        "/api/dispatches",
        Some(json!({ "selection": [], "authorized_by": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_record_lookup() {
    let (router, _worker) = test_router().await;
    send(&router, "POST", "/api/records", Some(record_body("Cardboard", 10.0))).await;

    let (status, body) = send(&router, "GET", "/api/records/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["material_type"], "Cardboard");

    let (status, body) = send(&router, "GET", "/api/records/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (status, _) = send(&router, "GET", "/api/records/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_report_and_reload() {
    let (router, _worker) = test_router().await;
    send(&router, "POST", "/api/records", Some(record_body("Glass", 3.0))).await;
    send(&router, "POST", "/api/records", Some(record_body("Metal", 1.0))).await;

    let (status, body) = send(&router, "GET", "/api/report", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rows"][0]["weight_share_pct"], 75.0);
    assert_eq!(body["data"]["totals"]["total_records"], 2);

    let (status, body) = send(&router, "POST", "/api/reload", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["records"], 2);

    let (status, _) = send(&router, "GET", "/api/records?from=soon", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

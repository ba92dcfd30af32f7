//! HTTP route tests driven through the router without a socket

mod common;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use common::{model_reply, ScriptedInference};
use notewise_core::{api::ErrorBody, router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_router(stub: ScriptedInference) -> Router {
    router(AppState::new(Arc::new(stub)))
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
    let response = router
        .oneshot(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

fn transform_body(text: &str) -> Value {
    json!({
        "text": text,
        "options": {"autoFormat": true, "highlightKeyTerms": true, "comments": false}
    })
}

#[tokio::test]
async fn test_transform_success() {
    let stub = ScriptedInference::replying(&model_reply(
        "# Osmosis",
        &["osmosis"],
        &["Should be dropped"],
    ));
    let (status, bytes) = post_json(test_router(stub), "/api/transform", transform_body("osmosis")).await;

    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(payload["formattedText"], "# Osmosis");
    assert_eq!(payload["highlights"], json!(["osmosis"]));
    assert_eq!(payload["comments"], json!([]));
}

#[tokio::test]
async fn test_transform_missing_option_names_field() {
    let stub = ScriptedInference::replying("unused");
    let body = json!({
        "text": "notes",
        "options": {"autoFormat": true, "comments": false}
    });
    let (status, bytes) = post_json(test_router(stub), "/api/transform", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorBody = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error.code, "invalid_request");
    assert_eq!(error.details.as_deref(), Some("options.highlightKeyTerms"));
}

#[tokio::test]
async fn test_transform_empty_text_rejected() {
    let stub = ScriptedInference::replying("unused");
    let (status, bytes) = post_json(test_router(stub), "/api/transform", transform_body("")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorBody = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error.details.as_deref(), Some("text"));
}

#[tokio::test]
async fn test_transform_unparseable_body_is_bad_request() {
    let response = test_router(ScriptedInference::replying("unused"))
        .oneshot(
            Request::post("/api/transform")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transform_without_credentials_is_unauthorized() {
    let stub = ScriptedInference::without_credentials();
    let (status, bytes) = post_json(test_router(stub), "/api/transform", transform_body("notes")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let error: ErrorBody = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error.code, "unauthenticated");
}

#[tokio::test]
async fn test_transform_malformed_reply_is_bad_gateway_with_excerpt() {
    let stub = ScriptedInference::replying("I cannot format these notes.");
    let (status, bytes) = post_json(test_router(stub), "/api/transform", transform_body("notes")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let error: ErrorBody = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error.details.as_deref(), Some("I cannot format these notes."));
}

#[tokio::test]
async fn test_definition_success() {
    let stub = ScriptedInference::replying("A unit of heredity.");
    let body = json!({"term": "gene", "context": "Genes are made of DNA."});
    let (status, bytes) = post_json(test_router(stub), "/api/definitions", body).await;

    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(payload, json!({"term": "gene", "definition": "A unit of heredity."}));
}

#[tokio::test]
async fn test_definition_failure_has_no_details() {
    let stub = ScriptedInference::replying("  ");
    let (status, bytes) = post_json(test_router(stub), "/api/definitions", json!({"term": "gene"})).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let payload: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(payload.get("details").is_none());
    assert_eq!(payload["code"], "empty_response");
}

#[tokio::test]
async fn test_definition_blank_term_rejected() {
    let stub = ScriptedInference::replying("unused");
    let (status, bytes) = post_json(test_router(stub), "/api/definitions", json!({"term": "   "})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let payload: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(payload.get("details").is_none());
}

#[tokio::test]
async fn test_health_reports_credentials() {
    let response = test_router(ScriptedInference::without_credentials())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let payload: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["credentials"], false);
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catalog routes, health check and CORS.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, request};

#[tokio::test]
async fn test_health() {
    let app = create_test_app().router;
    let response = app.oneshot(request("GET", "/health", None, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_list_all_concepts() {
    let test_app = create_test_app();
    let response = test_app
        .router
        .oneshot(request("GET", "/api/concepts", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let concepts = body["concepts"].as_array().unwrap();
    assert_eq!(concepts.len(), test_app.state.catalog.len());
    assert_eq!(concepts[0]["slug"], "getting-started");
    assert_eq!(concepts[0]["category"], "Core CLI");
    assert!(concepts[0]["shortDesc"].is_string());
}

#[tokio::test]
async fn test_list_by_category() {
    let app = create_test_app().router;
    let response = app
        .oneshot(request("GET", "/api/concepts?category=Core%20CLI", None, None))
        .await
        .unwrap();

    let body = body_json(response).await;
    let concepts = body["concepts"].as_array().unwrap();
    assert!(!concepts.is_empty());
    assert!(concepts.iter().all(|c| c["category"] == "Core CLI"));
}

#[tokio::test]
async fn test_unknown_category_rejected() {
    let app = create_test_app().router;
    let response = app
        .oneshot(request("GET", "/api/concepts?category=Gardening", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_concept_page() {
    let app = create_test_app().router;
    let response = app
        .oneshot(request("GET", "/api/concepts/subagents", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["concept"]["title"], "Subagents & Task Tool");

    let related = body["related"].as_array().unwrap();
    assert!(related.len() <= 3);
    assert!(related
        .iter()
        .all(|c| c["category"] == "Automation" && c["slug"] != "subagents"));

    assert_eq!(body["engagement"]["likeCount"], 0);
    assert_eq!(body["engagement"]["userLiked"], false);
    assert_eq!(body["engagement"]["comments"], serde_json::json!([]));
}

#[tokio::test]
async fn test_unknown_concept_is_404() {
    let app = create_test_app().router;
    let response = app
        .oneshot(request("GET", "/api/concepts/no-such-thing", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "not_found");
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = create_test_app().router;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/concepts/getting-started/like")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_rejects_foreign_origin() {
    let app = create_test_app().router;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/concepts")
                .header(header::ORIGIN, "https://evil.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

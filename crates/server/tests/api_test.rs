//! API tests against the in-memory store
//!
//! Paths that need a live LLM provider are gated with #[ignore].

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use kgchat_server::{router, AppState};
use tower::ServiceExt;

async fn test_app() -> (axum::Router, tempfile::TempDir) {
    let db = kgchat_db::init_memory().await.expect("Failed to init db");
    let dir = tempfile::tempdir().expect("Failed to create data dir");
    let state = AppState::new(db, dir.path());
    (router(state), dir)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _dir) = test_app().await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn info_starts_at_zero() {
    let (app, _dir) = test_app().await;
    let response = app
        .oneshot(Request::get("/info").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["num_entity"], 0);
    assert_eq!(body["num_relation"], 0);
}

#[tokio::test]
async fn upload_text_rejects_empty_input() {
    let (app, _dir) = test_app().await;
    let response = app
        .oneshot(json_request("/upload-text", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Empty input.");
}

#[tokio::test]
async fn upload_text_rejects_blank_text() {
    let (app, _dir) = test_app().await;
    let response = app
        .oneshot(json_request("/upload-text", r#"{"text": "   "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn query_rejects_empty_input() {
    let (app, _dir) = test_app().await;
    let response = app.oneshot(json_request("/query", "{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn query_on_empty_graph_says_it_does_not_know() {
    let (app, _dir) = test_app().await;
    let response = app
        .oneshot(json_request("/query", r#"{"text": "Who works at Acme?"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let answer = body["answer"].as_str().unwrap();
    assert!(answer.contains("don't know"), "unexpected answer: {answer}");
    assert_eq!(body["query"], "");
}

#[tokio::test]
async fn upload_file_rejects_unsupported_content_type() {
    let (app, dir) = test_app().await;

    let boundary = "kgchat-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"slides.pdf\"\r\n\
         Content-Type: application/pdf\r\n\r\n\
         %PDF-1.4 not really\r\n\
         --{boundary}--\r\n"
    );

    let request = Request::post("/upload-file")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The pipeline never ran: nothing persisted, nothing audited
    assert!(!dir.path().join("uploaded-content").exists());
    assert!(!dir.path().join("latest_statements.surql").exists());
}

#[tokio::test]
async fn upload_file_without_file_field_is_rejected() {
    let (app, _dir) = test_app().await;

    let boundary = "kgchat-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"other\"\r\n\r\n\
         hello\r\n\
         --{boundary}--\r\n"
    );

    let request = Request::post("/upload-file")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires a configured LLM provider (GEMINI_KEY or LLM_PROVIDER=ollama)"]
async fn upload_text_builds_the_graph_end_to_end() {
    let (app, _dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "/upload-text",
            r#"{"text": "Alice works at Acme. Acme released the Widget platform."}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["num_entity"].as_i64().unwrap() > 0);
}

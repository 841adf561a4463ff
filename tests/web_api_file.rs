//! Web API File Tests
//!
//! Integration tests for the file endpoints.

mod common;

use std::path::Path;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::multipart::MultipartForm;
use serde_json::Value;

use common::{bearer, create_hard_delete_app, create_test_app, create_test_app_with, file_form};

/// Upload `bytes` as `filename` for `owner` and return the envelope.
async fn upload(server: &axum_test::TestServer, owner: &str, filename: &str, bytes: &[u8]) -> Value {
    let response = server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer(owner, "user"))
        .multipart(file_form(filename, bytes))
        .await;

    response.assert_status_ok();
    response.json::<Value>()
}

// ============================================================================
// Upload Tests
// ============================================================================

#[tokio::test]
async fn test_upload_file() {
    let app = create_test_app().await;

    let body = upload(&app.server, "7", "photo.png", b"png bytes").await;

    assert_eq!(body["errors"], serde_json::json!([]));
    let file = &body["data"];
    assert_eq!(file["userID"], 7);
    assert_eq!(file["name"], "photo");
    assert_eq!(file["ext"], ".png");
    assert_eq!(file["size"], 9);
    assert_eq!(file["preset"], "notset");
    assert_eq!(file["status"], 0);
    assert_eq!(file["type"], 0);
    assert_eq!(file["hash"].as_str().unwrap().len(), 64);

    let path = file["path"].as_str().unwrap();
    assert!(Path::new(path).starts_with(app.dir.path().canonicalize().unwrap()));
    assert_eq!(std::fs::read(path).unwrap(), b"png bytes");
    assert!(file["src"].as_str().unwrap().starts_with("/uploads/"));
    assert!(file["src"].as_str().unwrap().ends_with("/photo.png"));
}

#[tokio::test]
async fn test_uploaded_file_is_served() {
    let app = create_test_app().await;

    let body = upload(&app.server, "7", "notes.txt", b"hello").await;
    let src = body["data"]["src"].as_str().unwrap().to_string();

    let response = app.server.get(&src).await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"hello");
}

#[tokio::test]
async fn test_upload_with_metadata_parts() {
    let app = create_test_app().await;

    let form = file_form("photo.png", b"png bytes")
        .add_text("preset", "thumbnail")
        .add_text("status", "2")
        .add_text("type", "1");
    let response = app
        .server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .multipart(form)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["preset"], "thumbnail");
    assert_eq!(body["data"]["status"], 2);
    assert_eq!(body["data"]["type"], 1);
}

#[tokio::test]
async fn test_upload_non_numeric_status() {
    let app = create_test_app().await;

    let form = file_form("photo.png", b"png bytes").add_text("status", "high");
    let response = app
        .server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .multipart(form)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "status");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_upload_without_file_part() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .multipart(MultipartForm::new().add_text("name", "orphan"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "file");
    assert_eq!(body["errors"][0]["message"], "No file provided");
}

#[tokio::test]
async fn test_upload_too_large() {
    let app = create_test_app_with(|config| config.storage.max_upload_size_mb = 1).await;

    let big = vec![0u8; 1024 * 1024 + 1];
    let response = app
        .server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .multipart(file_form("big.bin", &big))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "file");
    assert_eq!(body["errors"][0]["message"], "File too large (max 1 MB)");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_upload_requires_token() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/files")
        .multipart(file_form("photo.png", b"png bytes"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_rejects_other_roles() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer("7", "guest"))
        .multipart(file_form("photo.png", b"png bytes"))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_upload_rejects_invalid_token() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/files")
        .add_header(AUTHORIZATION, "Bearer not-a-token")
        .multipart(file_form("photo.png", b"png bytes"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Read Tests
// ============================================================================

#[tokio::test]
async fn test_get_file() {
    let app = create_test_app().await;
    let created = upload(&app.server, "7", "photo.png", b"png bytes").await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = app.server.get(&format!("/api/files/{}", id)).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"], created["data"]);
}

#[tokio::test]
async fn test_get_missing_file() {
    let app = create_test_app().await;

    let response = app.server.get("/api/files/999").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "ID");
    assert_eq!(body["errors"][0]["message"], "File not found");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_get_non_numeric_id() {
    let app = create_test_app().await;

    let response = app.server.get("/api/files/abc").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "ID");
}

#[tokio::test]
async fn test_list_files_with_filters() {
    let app = create_test_app().await;
    upload(&app.server, "7", "holiday.png", b"one").await;
    upload(&app.server, "7", "report.pdf", b"two").await;
    upload(&app.server, "8", "holiday.jpg", b"three").await;

    let response = app.server.get("/api/files?all=holiday&sort=id%20desc").await;
    response.assert_status_ok();
    let body: Value = response.json();
    let exts: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["ext"].as_str().unwrap())
        .collect();
    assert_eq!(exts, vec![".jpg", ".png"]);

    let response = app.server.get("/api/files?userid=7&ext=pdf").await;
    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "report");

    let response = app.server.get("/api/files?sort=size%20desc&limit=1").await;
    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["size"], 5);

    // Equal sizes fall back to id order.
    let response = app.server.get("/api/files?sort=size%20desc&limit=1&offset=2").await;
    let body: Value = response.json();
    assert_eq!(body["data"][0]["name"], "report");
}

#[tokio::test]
async fn test_list_files_rejects_unknown_sort() {
    let app = create_test_app().await;

    let response = app.server.get("/api/files?sort=password").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "sort");
    assert!(body["data"].is_null());
}

// ============================================================================
// Update Tests
// ============================================================================

#[tokio::test]
async fn test_replace_file_bytes() {
    let app = create_test_app().await;
    let created = upload(&app.server, "7", "draft.txt", b"first").await;
    let id = created["data"]["id"].as_i64().unwrap();
    let old_path = created["data"]["path"].as_str().unwrap().to_string();

    let response = app
        .server
        .patch(&format!("/api/files/{}", id))
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .multipart(file_form("final.md", b"second version"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["errors"], serde_json::json!([]));
    let file = &body["data"];
    assert_eq!(file["id"], id);
    assert_eq!(file["name"], "final");
    assert_eq!(file["ext"], ".md");
    assert_eq!(file["size"], 14);
    assert_ne!(file["hash"], created["data"]["hash"]);
    assert!(!Path::new(&old_path).exists());
    assert_eq!(
        std::fs::read(file["path"].as_str().unwrap()).unwrap(),
        b"second version"
    );
}

#[tokio::test]
async fn test_patch_metadata_only() {
    let app = create_test_app().await;
    let created = upload(&app.server, "7", "photo.png", b"png bytes").await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = app
        .server
        .patch(&format!("/api/files/{}", id))
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .multipart(MultipartForm::new().add_text("name", "cover").add_text("preset", "large"))
        .await;

    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "cover");
    assert_eq!(body["data"]["preset"], "large");
    assert_eq!(body["data"]["path"], created["data"]["path"]);
}

#[tokio::test]
async fn test_update_by_other_user_is_refused() {
    let app = create_test_app().await;
    let created = upload(&app.server, "7", "photo.png", b"png bytes").await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = app
        .server
        .patch(&format!("/api/files/{}", id))
        .add_header(AUTHORIZATION, bearer("8", "user"))
        .multipart(file_form("evil.png", b"evil"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "file");
    assert_eq!(body["errors"][0]["message"], "Only owner can change element");
    assert!(body["data"].is_null());

    let path = created["data"]["path"].as_str().unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"png bytes");
}

#[tokio::test]
async fn test_admin_replace_keeps_owner() {
    let app = create_test_app().await;
    let created = upload(&app.server, "7", "photo.png", b"png bytes").await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = app
        .server
        .patch(&format!("/api/files/{}", id))
        .add_header(AUTHORIZATION, bearer("1", "admin"))
        .multipart(file_form("photo2.png", b"new bytes"))
        .await;

    let body: Value = response.json();
    assert_eq!(body["data"]["userID"], 7);
    let old_dir = Path::new(created["data"]["path"].as_str().unwrap()).parent().unwrap();
    let new_dir = Path::new(body["data"]["path"].as_str().unwrap()).parent().unwrap();
    assert_eq!(old_dir, new_dir);
}

// ============================================================================
// Delete Tests
// ============================================================================

#[tokio::test]
async fn test_delete_file() {
    let app = create_test_app().await;
    let created = upload(&app.server, "7", "photo.png", b"png bytes").await;
    let id = created["data"]["id"].as_i64().unwrap();
    let path = created["data"]["path"].as_str().unwrap().to_string();

    let response = app
        .server
        .delete(&format!("/api/files/{}", id))
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["errors"], serde_json::json!([]));
    assert_eq!(body["data"]["id"], id);
    assert!(!Path::new(&path).exists());

    let body: Value = app.server.get(&format!("/api/files/{}", id)).await.json();
    assert_eq!(body["errors"][0]["message"], "File not found");

    let body: Value = app.server.get("/api/files").await.json();
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_delete_by_other_user_is_refused() {
    let app = create_test_app().await;
    let created = upload(&app.server, "7", "photo.png", b"png bytes").await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = app
        .server
        .delete(&format!("/api/files/{}", id))
        .add_header(AUTHORIZATION, bearer("8", "user"))
        .await;

    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "file");
    assert_eq!(body["errors"][0]["message"], "Only owner can delete element");
    assert!(Path::new(created["data"]["path"].as_str().unwrap()).exists());
}

#[tokio::test]
async fn test_delete_with_missing_bytes_is_advisory() {
    let app = create_hard_delete_app().await;
    let created = upload(&app.server, "7", "photo.png", b"png bytes").await;
    let id = created["data"]["id"].as_i64().unwrap();
    std::fs::remove_file(created["data"]["path"].as_str().unwrap()).unwrap();

    let response = app
        .server
        .delete(&format!("/api/files/{}", id))
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .await;

    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "file");
    assert_eq!(body["data"]["id"], id);

    let body: Value = app.server.get(&format!("/api/files/{}", id)).await.json();
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_delete_keeps_bytes_of_same_name_upload() {
    let app = create_test_app().await;
    let first = upload(&app.server, "7", "notes.txt", b"hello").await;
    let second = upload(&app.server, "7", "notes.txt", b"hello").await;
    assert_eq!(first["data"]["path"], second["data"]["path"]);
    let id = second["data"]["id"].as_i64().unwrap();

    let body: Value = app
        .server
        .delete(&format!("/api/files/{}", id))
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .await
        .json();
    assert_eq!(body["errors"], serde_json::json!([]));

    let src = first["data"]["src"].as_str().unwrap();
    let response = app.server.get(src).await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"hello");
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");

    let response = app.server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    let doc: Value = response.json();
    assert!(doc["paths"]["/files/{id}"].is_object());
}

//! Web API Attachment Tests
//!
//! Integration tests for the attachment endpoints, including the gallery
//! flow that ties uploads and attachments together.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use common::{bearer, create_test_app, file_form};

/// Upload a file for `owner` and return the envelope.
async fn upload(server: &TestServer, owner: &str, filename: &str) -> Value {
    server
        .post("/api/files")
        .add_header(AUTHORIZATION, bearer(owner, "user"))
        .multipart(file_form(filename, b"image bytes"))
        .await
        .json::<Value>()
}

/// Create an attachment as `owner` and return the envelope.
async fn create_attachment(server: &TestServer, owner: &str, body: Value) -> Value {
    let response = server
        .post("/api/attachments")
        .add_header(AUTHORIZATION, bearer(owner, "user"))
        .json(&body)
        .await;

    response.assert_status_ok();
    response.json::<Value>()
}

// ============================================================================
// Create Tests
// ============================================================================

#[tokio::test]
async fn test_gallery_flow() {
    let app = create_test_app().await;

    let file = upload(&app.server, "7", "photo.png").await;
    let file_id = file["data"]["id"].as_i64().unwrap();
    assert_eq!(file["data"]["ext"], ".png");

    let created = create_attachment(
        &app.server,
        "7",
        json!({"fileID": file_id, "group": "gallery", "title": "Cover", "isMain": true}),
    )
    .await;

    assert_eq!(created["errors"], json!([]));
    let attachment = &created["data"];
    assert_eq!(attachment["userID"], 7);
    assert_eq!(attachment["fileID"], file_id);
    assert_eq!(attachment["group"], "gallery");
    assert_eq!(attachment["isMain"], true);
    assert_eq!(attachment["hash"], file["data"]["hash"]);
    assert_eq!(attachment["file"]["id"], file_id);

    let id = attachment["id"].as_i64().unwrap();
    let body: Value = app
        .server
        .get(&format!("/api/attachments/{}", id))
        .await
        .json();
    assert_eq!(body["data"]["file"]["src"], file["data"]["src"]);

    // Deleting the file leaves the attachment pointing at nothing.
    app.server
        .delete(&format!("/api/files/{}", file_id))
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .await
        .assert_status_ok();

    let body: Value = app
        .server
        .get(&format!("/api/attachments/{}", id))
        .await
        .json();
    assert_eq!(body["data"]["fileID"], file_id);
    assert!(body["data"]["file"].is_null());
}

#[tokio::test]
async fn test_create_ignores_body_owner() {
    let app = create_test_app().await;

    let created = create_attachment(
        &app.server,
        "7",
        json!({"fileID": 1, "userID": 99, "group": "docs", "title": "Manual"}),
    )
    .await;

    assert_eq!(created["data"]["userID"], 7);
}

#[tokio::test]
async fn test_create_accepts_numeric_flag() {
    let app = create_test_app().await;

    let created = create_attachment(
        &app.server,
        "7",
        json!({"fileID": 1, "group": "docs", "title": "Manual", "isMain": 1}),
    )
    .await;

    assert_eq!(created["data"]["isMain"], true);
}

#[tokio::test]
async fn test_create_with_unreadable_body() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/attachments")
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .json(&json!({"fileID": "not a number"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "body");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_create_validates_fields() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/attachments")
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .json(&json!({"fileID": 1, "group": "g".repeat(65), "title": "Bad\u{7}title"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "group");
    assert_eq!(body["errors"][1]["field"], "title");
    assert!(body["data"].is_null());

    let body: Value = app.server.get("/api/attachments").await.json();
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_create_requires_token() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/attachments")
        .json(&json!({"fileID": 1}))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_rejects_other_roles() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/attachments")
        .add_header(AUTHORIZATION, bearer("7", "viewer"))
        .json(&json!({"fileID": 1}))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_with_non_numeric_caller() {
    let app = create_test_app().await;

    let created = create_attachment(&app.server, "alice", json!({"fileID": 1})).await;

    assert_eq!(created["errors"][0]["field"], "ID");
    assert!(created["data"].is_null());
}

// ============================================================================
// List Tests
// ============================================================================

#[tokio::test]
async fn test_list_attachments() {
    let app = create_test_app().await;
    create_attachment(
        &app.server,
        "7",
        json!({"fileID": 1, "group": "gallery", "title": "Beach", "index": 2}),
    )
    .await;
    create_attachment(
        &app.server,
        "7",
        json!({"fileID": 2, "group": "gallery", "title": "Sunset", "index": 1, "isMain": true}),
    )
    .await;
    create_attachment(
        &app.server,
        "8",
        json!({"fileID": 3, "group": "docs", "title": "Manual"}),
    )
    .await;

    let body: Value = app
        .server
        .get("/api/attachments?group=gallery&sort=index")
        .await
        .json();
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Sunset", "Beach"]);

    let body: Value = app.server.get("/api/attachments?ismain=true").await.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Sunset");

    let body: Value = app.server.get("/api/attachments?all=Manu").await.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["group"], "docs");

    let body: Value = app.server.get("/api/attachments?limit=-1").await.json();
    assert_eq!(body["errors"][0]["field"], "limit");
    assert!(body["data"].is_null());
}

// ============================================================================
// Update / Delete Tests
// ============================================================================

#[tokio::test]
async fn test_update_attachment() {
    let app = create_test_app().await;
    let created = create_attachment(
        &app.server,
        "7",
        json!({"fileID": 1, "group": "gallery", "title": "Cover"}),
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = app
        .server
        .patch(&format!("/api/attachments/{}", id))
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .json(&json!({"title": "New cover", "index": 3}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "New cover");
    assert_eq!(body["data"]["index"], 3);
    assert_eq!(body["data"]["group"], "gallery");
}

#[tokio::test]
async fn test_update_by_other_user_is_refused() {
    let app = create_test_app().await;
    let created = create_attachment(
        &app.server,
        "7",
        json!({"fileID": 1, "group": "gallery", "title": "Cover"}),
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = app
        .server
        .patch(&format!("/api/attachments/{}", id))
        .add_header(AUTHORIZATION, bearer("8", "user"))
        .json(&json!({"title": "Hijacked"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "ID");
    assert_eq!(body["errors"][0]["message"], "Only owner can change attachment");

    let response = app
        .server
        .patch(&format!("/api/attachments/{}", id))
        .add_header(AUTHORIZATION, bearer("1", "admin"))
        .json(&json!({"title": "Moderated"}))
        .await;
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "Moderated");
    assert_eq!(body["data"]["userID"], 7);
}

#[tokio::test]
async fn test_delete_attachment() {
    let app = create_test_app().await;
    let file = upload(&app.server, "7", "photo.png").await;
    let file_id = file["data"]["id"].as_i64().unwrap();
    let created = create_attachment(
        &app.server,
        "7",
        json!({"fileID": file_id, "group": "gallery", "title": "Cover"}),
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let body: Value = app
        .server
        .delete(&format!("/api/attachments/{}", id))
        .add_header(AUTHORIZATION, bearer("8", "user"))
        .await
        .json();
    assert_eq!(body["errors"][0]["message"], "Only owner can delete attachment");

    let body: Value = app
        .server
        .delete(&format!("/api/attachments/{}", id))
        .add_header(AUTHORIZATION, bearer("7", "user"))
        .await
        .json();
    assert_eq!(body["errors"], json!([]));
    assert_eq!(body["data"]["id"], id);

    let body: Value = app
        .server
        .get(&format!("/api/attachments/{}", id))
        .await
        .json();
    assert_eq!(body["errors"][0]["message"], "Attachment not found");

    // The file itself is untouched.
    let body: Value = app
        .server
        .get(&format!("/api/files/{}", file_id))
        .await
        .json();
    assert_eq!(body["data"]["id"], file_id);
}

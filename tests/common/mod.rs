//! Shared helpers for HTTP integration tests.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use jsonwebtoken::{encode, EncodingKey, Header};
use tempfile::TempDir;

use fileshelf::config::Config;
use fileshelf::web::middleware::JwtClaims;
use fileshelf::web::WebServer;
use fileshelf::{Database, DeleteMode};

/// Secret shared by the test server and minted tokens.
pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// A running test server plus the store directory backing it.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub dir: TempDir,
}

/// Build the configuration used by test servers.
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.storage.root = dir.path().display().to_string();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config
}

/// Create a test server over an in-memory database and a temporary store.
pub async fn create_test_app() -> TestApp {
    create_test_app_with(|_| {}).await
}

/// Create a test server after adjusting its configuration.
pub async fn create_test_app_with(adjust: impl FnOnce(&mut Config)) -> TestApp {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = test_config(&dir);
    adjust(&mut config);

    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let web = WebServer::new(&config, db.clone()).expect("Failed to create web server");
    let server = TestServer::new(web.router()).expect("Failed to create test server");

    TestApp { server, db, dir }
}

/// Create a test server that hard-deletes records.
pub async fn create_hard_delete_app() -> TestApp {
    create_test_app_with(|config| config.storage.delete_mode = DeleteMode::Hard).await
}

/// Mint a token for `sub` with `role`, valid for an hour.
pub fn token(sub: &str, role: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        sub: sub.to_string(),
        role: role.to_string(),
        iat: now as u64,
        exp: (now + 3600) as u64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to mint token")
}

/// `Authorization` header value for `sub` with `role`.
pub fn bearer(sub: &str, role: &str) -> String {
    format!("Bearer {}", token(sub, role))
}

/// A multipart form with a single `file` part.
pub fn file_form(filename: &str, bytes: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes.to_vec()).file_name(filename.to_string()),
    )
}

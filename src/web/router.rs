//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;

use super::handlers::{
    create_attachment, delete_attachment, delete_file, get_attachment, get_file,
    list_attachments, list_files, update_attachment, update_file, upload_file, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};
use super::openapi::ApiDoc;
use crate::file::ContentStore;

/// Slack for multipart framing and text parts on top of the upload cap.
const MULTIPART_SLACK: usize = 1024 * 1024;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    let upload_limit = DefaultBodyLimit::max(app_state.max_upload_bytes + MULTIPART_SLACK);

    let api_routes = Router::new()
        .route(
            "/files",
            get(list_files).post(upload_file).layer(upload_limit),
        )
        .route(
            "/files/:id",
            get(get_file)
                .patch(update_file)
                .delete(delete_file)
                .layer(upload_limit),
        )
        .route(
            "/attachments",
            get(list_attachments).post(create_attachment),
        )
        .route(
            "/attachments/:id",
            get(get_attachment)
                .patch(update_attachment)
                .delete(delete_attachment),
        );

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Serve stored bytes under the store's public prefix, so a file's `src`
/// resolves.
pub fn create_static_router(store: &ContentStore) -> Router {
    Router::new().nest_service(store.public_prefix(), ServeDir::new(store.base_path()))
}

/// Serve the OpenAPI document.
pub fn create_openapi_router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}

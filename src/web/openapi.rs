//! OpenAPI document.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::dto::{CreateAttachmentRequest, UpdateAttachmentRequest};
use super::error::{ErrorBody, ErrorCode, ErrorDetail};
use super::handlers;
use crate::file::{Attachment, File};
use crate::service::ErrorMsg;

/// Every record route answers with `{"errors": [ErrorMsg], "data": ...}`;
/// the documented body is the type carried in `data`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_files,
        handlers::get_file,
        handlers::upload_file,
        handlers::update_file,
        handlers::delete_file,
        handlers::list_attachments,
        handlers::get_attachment,
        handlers::create_attachment,
        handlers::update_attachment,
        handlers::delete_attachment,
    ),
    components(
        schemas(
            File,
            Attachment,
            ErrorMsg,
            CreateAttachmentRequest,
            UpdateAttachmentRequest,
            ErrorBody,
            ErrorDetail,
            ErrorCode,
        )
    ),
    tags(
        (name = "files", description = "Stored files and their metadata"),
        (name = "attachments", description = "Files bound to a titled, grouped context"),
    ),
    modifiers(&SecurityAddon),
    servers((url = "/api")),
    info(
        title = "fileshelf API",
        description = "File ingestion and metadata service",
    )
)]
pub struct ApiDoc;

/// Registers the bearer JWT scheme referenced by mutating routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

//! Attachment handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{parse_id, AppState};
use crate::file::Attachment;
use crate::service::Envelope;
use crate::web::dto::{CreateAttachmentRequest, EnvelopeJson, UpdateAttachmentRequest};
use crate::web::error::ApiError;
use crate::web::middleware::AuthCaller;

/// GET /api/attachments - List attachments.
#[utoipa::path(
    get,
    path = "/attachments",
    tag = "attachments",
    params(
        ("all" = Option<String>, Query, description = "Substring searched across id, title, description and group"),
        ("sort" = Option<String>, Query, description = "Comma-separated `key [asc|desc]` list"),
        ("limit" = Option<i64>, Query, description = "Maximum number of records"),
        ("offset" = Option<i64>, Query, description = "Records to skip")
    ),
    responses(
        (status = 200, description = "Envelope whose data is a list of attachments", body = [Attachment])
    )
)]
pub async fn list_attachments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<Vec<Attachment>>>, ApiError> {
    Ok(Json(state.attachments().list(&params).await?))
}

/// GET /api/attachments/:id - Get an attachment with its file.
#[utoipa::path(
    get,
    path = "/attachments/{id}",
    tag = "attachments",
    params(
        ("id" = i64, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "Envelope whose data is the attachment", body = Attachment)
    )
)]
pub async fn get_attachment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Attachment>>, ApiError> {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(rejected) => return Ok(rejected),
    };
    Ok(Json(state.attachments().get_by_id(id).await?))
}

/// POST /api/attachments - Create an attachment.
#[utoipa::path(
    post,
    path = "/attachments",
    tag = "attachments",
    request_body = CreateAttachmentRequest,
    responses(
        (status = 200, description = "Envelope whose data is the new attachment", body = Attachment),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not modify records")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_attachment(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    EnvelopeJson(req): EnvelopeJson<CreateAttachmentRequest>,
) -> Result<Json<Envelope<Attachment>>, ApiError> {
    Ok(Json(state.attachments().create(&caller, req.into()).await?))
}

/// PATCH /api/attachments/:id - Update an attachment.
#[utoipa::path(
    patch,
    path = "/attachments/{id}",
    tag = "attachments",
    params(
        ("id" = i64, Path, description = "Attachment ID")
    ),
    request_body = UpdateAttachmentRequest,
    responses(
        (status = 200, description = "Envelope whose data is the updated attachment", body = Attachment),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not modify records")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_attachment(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<String>,
    EnvelopeJson(req): EnvelopeJson<UpdateAttachmentRequest>,
) -> Result<Json<Envelope<Attachment>>, ApiError> {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(rejected) => return Ok(rejected),
    };
    Ok(Json(
        state
            .attachments()
            .update(&caller, id, req.into())
            .await?,
    ))
}

/// DELETE /api/attachments/:id - Delete an attachment.
#[utoipa::path(
    delete,
    path = "/attachments/{id}",
    tag = "attachments",
    params(
        ("id" = i64, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "Envelope whose data is the deleted attachment", body = Attachment),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not modify records")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_attachment(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Attachment>>, ApiError> {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(rejected) => return Ok(rejected),
    };
    Ok(Json(state.attachments().delete(&caller, id).await?))
}

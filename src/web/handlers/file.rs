//! File handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{parse_id, AppState};
use crate::file::File;
use crate::service::{Envelope, FilePatch, Upload, FIELD_BODY, FIELD_FILE};
use crate::web::error::ApiError;
use crate::web::middleware::AuthCaller;

/// Parts of a file upload form.
#[derive(Debug, Default)]
pub struct FileForm {
    pub upload: Option<Upload>,
    pub patch: FilePatch,
}

fn too_large(max_bytes: usize) -> String {
    format!("File too large (max {} MB)", max_bytes / 1024 / 1024)
}

fn multipart_error(err: &MultipartError, max_bytes: usize) -> (&'static str, String) {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        (FIELD_FILE, too_large(max_bytes))
    } else {
        tracing::debug!("Failed to read multipart field: {}", err);
        (FIELD_BODY, "Invalid multipart data".to_string())
    }
}

/// Read a multipart form into an upload and a metadata patch.
///
/// Every problem found is returned as an envelope error.
pub async fn read_form(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<FileForm, Envelope<File>> {
    let mut form = FileForm::default();
    let mut envelope = Envelope::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                let (field, message) = multipart_error(&e, max_bytes);
                envelope.add_error(field, message);
                return Err(envelope);
            }
        };

        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or("").to_string();
            let bytes = match field.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    let (field, message) = multipart_error(&e, max_bytes);
                    envelope.add_error(field, message);
                    return Err(envelope);
                }
            };
            if bytes.len() > max_bytes {
                envelope.add_error(FIELD_FILE, too_large(max_bytes));
                continue;
            }
            form.upload = Some(Upload::new(filename, bytes.to_vec()));
            continue;
        }

        if !matches!(name.as_str(), "name" | "preset" | "status" | "type") {
            continue;
        }

        let text = match field.text().await {
            Ok(text) => text,
            Err(e) => {
                let (field, message) = multipart_error(&e, max_bytes);
                envelope.add_error(field, message);
                return Err(envelope);
            }
        };

        match name.as_str() {
            "name" => form.patch.name = Some(text),
            "preset" => form.patch.preset = Some(text),
            "status" | "type" => match text.trim().parse::<i64>() {
                Ok(n) if name == "status" => form.patch.status = Some(n),
                Ok(n) => form.patch.kind = Some(n),
                Err(_) => envelope.add_error(name.clone(), format!("{} must be an integer", name)),
            },
            _ => {}
        }
    }

    if envelope.has_errors() {
        return Err(envelope);
    }
    Ok(form)
}

/// GET /api/files - List files.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    params(
        ("all" = Option<String>, Query, description = "Substring searched across id, name, path and ext"),
        ("sort" = Option<String>, Query, description = "Comma-separated `key [asc|desc]` list"),
        ("limit" = Option<i64>, Query, description = "Maximum number of records"),
        ("offset" = Option<i64>, Query, description = "Records to skip")
    ),
    responses(
        (status = 200, description = "Envelope whose data is a list of files", body = [File])
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<Vec<File>>>, ApiError> {
    Ok(Json(state.files().list(&params).await?))
}

/// GET /api/files/:id - Get file metadata.
#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Envelope whose data is the file", body = File)
    )
)]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<File>>, ApiError> {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(rejected) => return Ok(rejected),
    };
    Ok(Json(state.files().get_by_id(id).await?))
}

/// POST /api/files - Upload a file.
///
/// Request body: multipart/form-data with a "file" part and optional
/// "name", "preset", "status" and "type" parts.
#[utoipa::path(
    post,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "Envelope whose data is the stored file", body = File),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not modify records")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    multipart: Multipart,
) -> Result<Json<Envelope<File>>, ApiError> {
    let form = match read_form(multipart, state.max_upload_bytes).await {
        Ok(form) => form,
        Err(envelope) => return Ok(Json(envelope)),
    };

    let Some(upload) = form.upload else {
        return Ok(Json(Envelope::error(FIELD_FILE, "No file provided")));
    };

    Ok(Json(state.files().create(&caller, upload, form.patch).await?))
}

/// PATCH /api/files/:id - Replace a file's bytes and/or metadata.
///
/// Request body: multipart/form-data; a "file" part replaces the bytes,
/// "name", "preset", "status" and "type" parts patch the metadata.
#[utoipa::path(
    patch,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Envelope whose data is the updated file", body = File),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not modify records")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_file(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Envelope<File>>, ApiError> {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(rejected) => return Ok(rejected),
    };
    let form = match read_form(multipart, state.max_upload_bytes).await {
        Ok(form) => form,
        Err(envelope) => return Ok(Json(envelope)),
    };

    Ok(Json(
        state
            .files()
            .update(&caller, id, form.upload, form.patch)
            .await?,
    ))
}

/// DELETE /api/files/:id - Delete a file.
#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Envelope whose data is the deleted file", body = File),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not modify records")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    Path(id): Path<String>,
) -> Result<Json<Envelope<File>>, ApiError> {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(rejected) => return Ok(rejected),
    };
    Ok(Json(state.files().delete(&caller, id).await?))
}

//! API handlers.

pub mod attachment;
pub mod file;

pub use attachment::*;
pub use file::*;

use axum::Json;

use crate::db::{Database, DeleteMode};
use crate::file::ContentStore;
use crate::service::{AttachmentService, Envelope, FileService, FIELD_ID};

/// Shared state for record handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub store: ContentStore,
    pub delete_mode: DeleteMode,
    /// Largest accepted `file` part.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        db: Database,
        store: ContentStore,
        delete_mode: DeleteMode,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            db,
            store,
            delete_mode,
            max_upload_bytes,
        }
    }

    pub fn files(&self) -> FileService<'_> {
        FileService::new(&self.db, &self.store, self.delete_mode)
    }

    pub fn attachments(&self) -> AttachmentService<'_> {
        AttachmentService::new(&self.db, self.delete_mode)
    }
}

/// Parse a record id from the path, reporting junk on `ID`.
pub(crate) fn parse_id<T>(raw: &str) -> Result<i64, Json<Envelope<T>>> {
    raw.parse::<i64>()
        .map_err(|_| Json(Envelope::error(FIELD_ID, format!("Invalid ID: {}", raw))))
}

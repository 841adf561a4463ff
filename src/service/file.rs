//! File record service.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::{client_message, Envelope, FIELD_FILE, FIELD_ID};
use crate::auth::{authorize, Action, Caller};
use crate::db::{Database, DeleteMode};
use crate::file::{ContentStore, File, FileRepository, FileUpdate};
use crate::query::{ListQuery, FILES};
use crate::Result;

const NOT_FOUND: &str = "File not found";
const NOT_OWNER_UPDATE: &str = "Only owner can change element";
const NOT_OWNER_DELETE: &str = "Only owner can delete element";

/// An uploaded file part.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Filename as sent by the client.
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Metadata fields a client may set directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilePatch {
    pub name: Option<String>,
    pub preset: Option<String>,
    pub status: Option<i64>,
    pub kind: Option<i64>,
}

impl FilePatch {
    fn apply(&self, mut update: FileUpdate) -> FileUpdate {
        if let Some(ref name) = self.name {
            update = update.name(name.clone());
        }
        if let Some(ref preset) = self.preset {
            update = update.preset(preset.clone());
        }
        if let Some(status) = self.status {
            update = update.status(status);
        }
        if let Some(kind) = self.kind {
            update = update.kind(kind);
        }
        update
    }
}

/// List, read, upload, replace and delete files.
pub struct FileService<'a> {
    db: &'a Database,
    store: &'a ContentStore,
    delete_mode: DeleteMode,
}

impl<'a> FileService<'a> {
    pub fn new(db: &'a Database, store: &'a ContentStore, delete_mode: DeleteMode) -> Self {
        Self {
            db,
            store,
            delete_mode,
        }
    }

    fn repo(&self) -> FileRepository<'_> {
        FileRepository::new(self.db.pool())
    }

    /// List live files matching request parameters.
    pub async fn list(&self, params: &HashMap<String, String>) -> Result<Envelope<Vec<File>>> {
        let query = match ListQuery::from_params(&FILES, params) {
            Ok(query) => query,
            Err(e) => return Ok(Envelope::error(e.param, e.message)),
        };

        Ok(Envelope::ok(self.repo().list(&query).await?))
    }

    /// Fetch one live file.
    pub async fn get_by_id(&self, id: i64) -> Result<Envelope<File>> {
        Ok(match self.repo().get_by_id(id).await? {
            Some(file) => Envelope::ok(file),
            None => Envelope::error(FIELD_ID, NOT_FOUND),
        })
    }

    /// Store an upload and record it as owned by the caller.
    pub async fn create(
        &self,
        caller: &Caller,
        upload: Upload,
        patch: FilePatch,
    ) -> Result<Envelope<File>> {
        let Some(owner_id) = caller.owner_id() else {
            return Ok(Envelope::error(
                FIELD_ID,
                "Caller id is not a valid user id",
            ));
        };

        let stored = match self.store.store(&upload.bytes, &upload.filename, owner_id) {
            Ok(stored) => stored,
            Err(e) => return Ok(Envelope::error(FIELD_FILE, client_message(&e))),
        };

        let repo = self.repo();
        let file = match repo.create(&stored).await {
            Ok(file) => file,
            Err(e) => {
                let _ = self.store.delete(&stored.path);
                return Err(e);
            }
        };

        let patched = patch.apply(FileUpdate::new());
        let file = if patched.is_empty() {
            file
        } else {
            repo.update(file.id, &patched).await?.unwrap_or(file)
        };

        info!(id = file.id, owner_id, name = %file.name, "file created");
        Ok(Envelope::ok(file))
    }

    /// Replace a file's bytes and/or patch its metadata.
    ///
    /// New bytes are written first and the record is pointed at them; the old
    /// bytes are removed only once that update has committed. A failed write
    /// leaves the record as it was. A failed update discards the new bytes.
    /// A failed removal is reported alongside the updated record.
    pub async fn update(
        &self,
        caller: &Caller,
        id: i64,
        upload: Option<Upload>,
        patch: FilePatch,
    ) -> Result<Envelope<File>> {
        let repo = self.repo();
        let Some(existing) = repo.get_by_id(id).await? else {
            return Ok(Envelope::error(FIELD_ID, NOT_FOUND));
        };

        if authorize(Action::Update, existing.user_id, caller).is_err() {
            return Ok(Envelope::error(FIELD_FILE, NOT_OWNER_UPDATE));
        }

        let mut update = FileUpdate::new();
        let mut stored_path = None;

        if let Some(upload) = upload {
            // Bytes stay under the record owner's partition even when an admin replaces them.
            let written = self
                .store
                .store(&upload.bytes, &upload.filename, existing.user_id);
            let stored = match written {
                Ok(stored) => stored,
                Err(e) => return Ok(Envelope::error(FIELD_FILE, client_message(&e))),
            };
            update = update.content(&stored);
            stored_path = Some(stored.path);
        }

        let update = patch.apply(update);
        if update.is_empty() {
            return Ok(Envelope::ok(existing));
        }

        let updated = match repo.update(id, &update).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(ref path) = stored_path {
                    self.discard(id, path, &existing.path).await;
                }
                return Err(e);
            }
        };

        let Some(file) = updated else {
            if let Some(ref path) = stored_path {
                self.discard(id, path, &existing.path).await;
            }
            return Ok(Envelope::error(FIELD_ID, NOT_FOUND));
        };

        let mut envelope = Envelope::new();
        if stored_path.is_some_and(|path| path != existing.path) {
            if let Err(e) = self.release(id, &existing.path).await {
                warn!(id, path = %existing.path, error = %e, "failed to remove superseded bytes");
                envelope.add_error(FIELD_FILE, client_message(&e));
            }
        }

        info!(id, caller = %caller.id, "file updated");
        Ok(envelope.with_data(file))
    }

    /// Delete a file record and its bytes.
    ///
    /// A failure to remove the bytes is reported but the record is still
    /// deleted. Bytes another live record points at are kept.
    pub async fn delete(&self, caller: &Caller, id: i64) -> Result<Envelope<File>> {
        let repo = self.repo();
        let Some(existing) = repo.get_by_id(id).await? else {
            return Ok(Envelope::error(FIELD_ID, NOT_FOUND));
        };

        if authorize(Action::Delete, existing.user_id, caller).is_err() {
            return Ok(Envelope::error(FIELD_FILE, NOT_OWNER_DELETE));
        }

        if !repo.delete(id, self.delete_mode).await? {
            return Ok(Envelope::error(FIELD_ID, NOT_FOUND));
        }

        let mut envelope = Envelope::new();
        if let Err(e) = self.release(id, &existing.path).await {
            warn!(id, path = %existing.path, error = %e, "failed to remove file bytes");
            envelope.add_error(FIELD_FILE, client_message(&e));
        }

        info!(id, caller = %caller.id, mode = ?self.delete_mode, "file deleted");
        Ok(envelope.with_data(existing))
    }

    /// Remove bytes record `id` no longer uses, unless another live record
    /// still points at them.
    async fn release(&self, id: i64, path: &str) -> Result<()> {
        if self.repo().path_in_use(path, id).await? {
            debug!(id, path, "bytes still referenced, keeping them");
            return Ok(());
        }
        self.store.delete(path)
    }

    /// Drop freshly written bytes after the record update failed.
    ///
    /// Nothing is removed when they landed on the record's current path.
    async fn discard(&self, id: i64, stored_path: &str, current_path: &str) {
        if stored_path == current_path {
            return;
        }
        if let Err(e) = self.release(id, stored_path).await {
            warn!(id, path = stored_path, error = %e, "failed to discard new bytes");
        }
    }
}

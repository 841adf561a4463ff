//! Attachment record service.

use std::collections::HashMap;

use tracing::info;

use super::{Envelope, FIELD_ID};
use crate::auth::{authorize, Action, Caller};
use crate::db::{Database, DeleteMode};
use crate::file::{Attachment, AttachmentRepository, AttachmentUpdate, FileRepository, NewAttachment};
use crate::query::{ListQuery, ATTACHMENTS};
use crate::Result;

const NOT_FOUND: &str = "Attachment not found";
const NOT_OWNER_UPDATE: &str = "Only owner can change attachment";
const NOT_OWNER_DELETE: &str = "Only owner can delete attachment";

/// List, read, create, update and delete attachments.
pub struct AttachmentService<'a> {
    db: &'a Database,
    delete_mode: DeleteMode,
}

impl<'a> AttachmentService<'a> {
    pub fn new(db: &'a Database, delete_mode: DeleteMode) -> Self {
        Self { db, delete_mode }
    }

    fn repo(&self) -> AttachmentRepository<'_> {
        AttachmentRepository::new(self.db.pool())
    }

    /// List live attachments matching request parameters.
    pub async fn list(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<Envelope<Vec<Attachment>>> {
        let query = match ListQuery::from_params(&ATTACHMENTS, params) {
            Ok(query) => query,
            Err(e) => return Ok(Envelope::error(e.param, e.message)),
        };

        Ok(Envelope::ok(self.repo().list(&query).await?))
    }

    /// Fetch one live attachment with its file.
    pub async fn get_by_id(&self, id: i64) -> Result<Envelope<Attachment>> {
        Ok(match self.repo().get_with_file(id).await? {
            Some(attachment) => Envelope::ok(attachment),
            None => Envelope::error(FIELD_ID, NOT_FOUND),
        })
    }

    /// Create an attachment owned by the caller.
    ///
    /// Without an explicit hash, the referenced file's hash is copied in.
    pub async fn create(
        &self,
        caller: &Caller,
        mut attachment: NewAttachment,
    ) -> Result<Envelope<Attachment>> {
        let Some(owner_id) = caller.owner_id() else {
            return Ok(Envelope::error(
                FIELD_ID,
                "Caller id is not a valid user id",
            ));
        };
        attachment.user_id = owner_id;

        if attachment.hash.is_empty() {
            if let Some(file) = FileRepository::new(self.db.pool())
                .get_by_id(attachment.file_id)
                .await?
            {
                attachment.hash = file.hash;
            }
        }

        let repo = self.repo();
        let created = repo.create(&attachment).await?;
        info!(id = created.id, owner_id, file_id = created.file_id, "attachment created");

        Ok(match repo.get_with_file(created.id).await? {
            Some(loaded) => Envelope::ok(loaded),
            None => Envelope::error(FIELD_ID, NOT_FOUND),
        })
    }

    /// Merge present fields into an attachment.
    pub async fn update(
        &self,
        caller: &Caller,
        id: i64,
        update: AttachmentUpdate,
    ) -> Result<Envelope<Attachment>> {
        let repo = self.repo();
        let Some(existing) = repo.get_by_id(id).await? else {
            return Ok(Envelope::error(FIELD_ID, NOT_FOUND));
        };

        if authorize(Action::Update, existing.user_id, caller).is_err() {
            return Ok(Envelope::error(FIELD_ID, NOT_OWNER_UPDATE));
        }

        if repo.update(id, &update).await?.is_none() {
            return Ok(Envelope::error(FIELD_ID, NOT_FOUND));
        }
        info!(id, caller = %caller.id, "attachment updated");

        Ok(match repo.get_with_file(id).await? {
            Some(loaded) => Envelope::ok(loaded),
            None => Envelope::error(FIELD_ID, NOT_FOUND),
        })
    }

    /// Delete an attachment. The referenced file is untouched.
    pub async fn delete(&self, caller: &Caller, id: i64) -> Result<Envelope<Attachment>> {
        let repo = self.repo();
        let Some(existing) = repo.get_by_id(id).await? else {
            return Ok(Envelope::error(FIELD_ID, NOT_FOUND));
        };

        if authorize(Action::Delete, existing.user_id, caller).is_err() {
            return Ok(Envelope::error(FIELD_ID, NOT_OWNER_DELETE));
        }

        if !repo.delete(id, self.delete_mode).await? {
            return Ok(Envelope::error(FIELD_ID, NOT_FOUND));
        }
        info!(id, caller = %caller.id, mode = ?self.delete_mode, "attachment deleted");

        Ok(Envelope::ok(existing))
    }
}

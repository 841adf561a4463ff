//! Attachment records binding a file to a titled, grouped context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, SqlitePool};
use utoipa::ToSchema;

use super::metadata::{File, FileRepository};
use crate::db::DeleteMode;
use crate::query::{ListQuery, ATTACHMENTS};
use crate::{Result, ShelfError};

/// An attachment record.
///
/// `file_id` is not enforced by the database; the referenced file may have
/// been deleted, in which case `file` stays `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    #[serde(rename = "userID")]
    pub user_id: i64,
    /// Namespace for related attachments.
    #[sqlx(rename = "group_tag")]
    pub group: String,
    #[serde(rename = "fileID")]
    pub file_id: i64,
    pub title: String,
    pub description: String,
    pub is_main: bool,
    /// Hash of the referenced file when the attachment was created.
    pub hash: String,
    /// Ordering key within the group.
    #[sqlx(rename = "sort_index")]
    pub index: i64,
    /// The referenced file, when loaded and still live.
    #[sqlx(skip)]
    pub file: Option<File>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Data for creating a new attachment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewAttachment {
    pub user_id: i64,
    pub group: String,
    pub file_id: i64,
    pub title: String,
    pub description: String,
    pub is_main: bool,
    pub hash: String,
    pub index: i64,
}

impl NewAttachment {
    /// Create a new attachment for a file.
    pub fn new(file_id: i64, group: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            file_id,
            group: group.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the owner.
    pub fn with_owner(mut self, user_id: i64) -> Self {
        self.user_id = user_id;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark as the main attachment of its group.
    pub fn with_main(mut self, is_main: bool) -> Self {
        self.is_main = is_main;
        self
    }

    /// Set the hash.
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    /// Set the ordering index.
    pub fn with_index(mut self, index: i64) -> Self {
        self.index = index;
        self
    }
}

/// Builder for updating an attachment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentUpdate {
    pub group: Option<String>,
    pub file_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_main: Option<bool>,
    pub hash: Option<String>,
    pub index: Option<i64>,
}

impl AttachmentUpdate {
    /// Create a new AttachmentUpdate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the referenced file.
    pub fn file_id(mut self, file_id: i64) -> Self {
        self.file_id = Some(file_id);
        self
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the main flag.
    pub fn is_main(mut self, is_main: bool) -> Self {
        self.is_main = Some(is_main);
        self
    }

    /// Set the hash.
    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Set the ordering index.
    pub fn index(mut self, index: i64) -> Self {
        self.index = Some(index);
        self
    }

    /// Check if the update is empty.
    pub fn is_empty(&self) -> bool {
        self.group.is_none()
            && self.file_id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.is_main.is_none()
            && self.hash.is_none()
            && self.index.is_none()
    }
}

/// Repository for attachment operations.
pub struct AttachmentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AttachmentRepository<'a> {
    /// Create a new AttachmentRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new attachment.
    pub async fn create(&self, attachment: &NewAttachment) -> Result<Attachment> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO attachments (user_id, group_tag, file_id, title, description, is_main, hash, sort_index, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(attachment.user_id)
        .bind(&attachment.group)
        .bind(attachment.file_id)
        .bind(&attachment.title)
        .bind(&attachment.description)
        .bind(attachment.is_main)
        .bind(&attachment.hash)
        .bind(attachment.index)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| ShelfError::NotFound("attachment".to_string()))
    }

    /// Get a live attachment by ID, without its file.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Attachment>> {
        let query = format!(
            "SELECT {} FROM attachments WHERE id = ? AND deleted_at IS NULL",
            ATTACHMENTS.columns
        );
        let attachment = sqlx::query_as::<_, Attachment>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(attachment)
    }

    /// Get a live attachment by ID with its referenced file loaded.
    pub async fn get_with_file(&self, id: i64) -> Result<Option<Attachment>> {
        let Some(mut attachment) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        attachment.file = FileRepository::new(self.pool)
            .get_by_id(attachment.file_id)
            .await?;

        Ok(Some(attachment))
    }

    /// List live attachments matching a query.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Attachment>> {
        query.fetch_all(self.pool).await
    }

    /// Update an attachment.
    pub async fn update(&self, id: i64, update: &AttachmentUpdate) -> Result<Option<Attachment>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE attachments SET ");
        let mut separated = query.separated(", ");

        if let Some(ref group) = update.group {
            separated.push("group_tag = ");
            separated.push_bind_unseparated(group.clone());
        }
        if let Some(file_id) = update.file_id {
            separated.push("file_id = ");
            separated.push_bind_unseparated(file_id);
        }
        if let Some(ref title) = update.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title.clone());
        }
        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }
        if let Some(is_main) = update.is_main {
            separated.push("is_main = ");
            separated.push_bind_unseparated(is_main);
        }
        if let Some(ref hash) = update.hash {
            separated.push("hash = ");
            separated.push_bind_unseparated(hash.clone());
        }
        if let Some(index) = update.index {
            separated.push("sort_index = ");
            separated.push_bind_unseparated(index);
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" AND deleted_at IS NULL");

        let result = query.build().execute(self.pool).await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete an attachment. Returns `false` if no live entry had that ID.
    pub async fn delete(&self, id: i64, mode: DeleteMode) -> Result<bool> {
        let result = match mode {
            DeleteMode::Soft => {
                sqlx::query(
                    "UPDATE attachments SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL",
                )
                .bind(Utc::now())
                .bind(id)
                .execute(self.pool)
                .await?
            }
            DeleteMode::Hard => {
                sqlx::query("DELETE FROM attachments WHERE id = ?")
                    .bind(id)
                    .execute(self.pool)
                    .await?
            }
        };

        Ok(result.rows_affected() > 0)
    }
}

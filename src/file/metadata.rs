//! File metadata types and repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, SqlitePool};
use utoipa::ToSchema;

use crate::db::DeleteMode;
use crate::query::{ListQuery, FILES};
use crate::{Result, ShelfError};

/// Preset assigned to uploads that don't declare one.
pub const DEFAULT_PRESET: &str = "notset";

/// Metadata for stored bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Unique file ID.
    pub id: i64,
    /// Owning user.
    #[serde(rename = "userID")]
    pub user_id: i64,
    /// Original filename without extension.
    pub name: String,
    /// Location of the bytes on disk.
    pub path: String,
    /// Public URL of the bytes.
    pub src: String,
    /// Extension including the leading dot.
    pub ext: String,
    /// Category tag.
    pub preset: String,
    /// Size in bytes.
    pub size: i64,
    /// Application-defined status.
    pub status: i64,
    /// Application-defined type.
    #[serde(rename = "type")]
    #[sqlx(rename = "file_type")]
    pub kind: i64,
    /// Hex SHA-256 of the bytes at `path`.
    pub hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Data for creating a new file entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFile {
    pub user_id: i64,
    pub name: String,
    pub ext: String,
    pub path: String,
    pub src: String,
    pub preset: String,
    pub size: i64,
    pub status: i64,
    pub kind: i64,
    pub hash: String,
}

impl NewFile {
    /// Create a new NewFile with default preset, status and type.
    pub fn new(
        user_id: i64,
        name: impl Into<String>,
        ext: impl Into<String>,
        path: impl Into<String>,
        size: i64,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            name: name.into(),
            ext: ext.into(),
            path: path.into(),
            src: String::new(),
            preset: DEFAULT_PRESET.to_string(),
            size,
            status: 0,
            kind: 0,
            hash: hash.into(),
        }
    }

    /// Set the public URL.
    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = src.into();
        self
    }
}

/// Builder for updating file metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileUpdate {
    pub name: Option<String>,
    pub ext: Option<String>,
    pub path: Option<String>,
    pub src: Option<String>,
    pub preset: Option<String>,
    pub size: Option<i64>,
    pub status: Option<i64>,
    pub kind: Option<i64>,
    pub hash: Option<String>,
}

impl FileUpdate {
    /// Create a new FileUpdate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the record at freshly stored bytes.
    ///
    /// Preset, status and type are left as they are.
    pub fn content(mut self, stored: &NewFile) -> Self {
        self.name = Some(stored.name.clone());
        self.ext = Some(stored.ext.clone());
        self.path = Some(stored.path.clone());
        self.src = Some(stored.src.clone());
        self.size = Some(stored.size);
        self.hash = Some(stored.hash.clone());
        self
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the preset.
    pub fn preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    /// Set the status.
    pub fn status(mut self, status: i64) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the type.
    pub fn kind(mut self, kind: i64) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Check if the update is empty.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.ext.is_none()
            && self.path.is_none()
            && self.src.is_none()
            && self.preset.is_none()
            && self.size.is_none()
            && self.status.is_none()
            && self.kind.is_none()
            && self.hash.is_none()
    }
}

/// Repository for file metadata operations.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new file entry.
    pub async fn create(&self, file: &NewFile) -> Result<File> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO files (user_id, name, path, src, ext, preset, size, status, file_type, hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(file.user_id)
        .bind(&file.name)
        .bind(&file.path)
        .bind(&file.src)
        .bind(&file.ext)
        .bind(&file.preset)
        .bind(file.size)
        .bind(file.status)
        .bind(file.kind)
        .bind(&file.hash)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| ShelfError::NotFound("file".to_string()))
    }

    /// Get a live file by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<File>> {
        let query = format!(
            "SELECT {} FROM files WHERE id = ? AND deleted_at IS NULL",
            FILES.columns
        );
        let file = sqlx::query_as::<_, File>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(file)
    }

    /// List live files matching a query.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<File>> {
        query.fetch_all(self.pool).await
    }

    /// Update file metadata.
    pub async fn update(&self, id: i64, update: &FileUpdate) -> Result<Option<File>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE files SET ");
        let mut separated = query.separated(", ");

        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.clone());
        }
        if let Some(ref ext) = update.ext {
            separated.push("ext = ");
            separated.push_bind_unseparated(ext.clone());
        }
        if let Some(ref path) = update.path {
            separated.push("path = ");
            separated.push_bind_unseparated(path.clone());
        }
        if let Some(ref src) = update.src {
            separated.push("src = ");
            separated.push_bind_unseparated(src.clone());
        }
        if let Some(ref preset) = update.preset {
            separated.push("preset = ");
            separated.push_bind_unseparated(preset.clone());
        }
        if let Some(size) = update.size {
            separated.push("size = ");
            separated.push_bind_unseparated(size);
        }
        if let Some(status) = update.status {
            separated.push("status = ");
            separated.push_bind_unseparated(status);
        }
        if let Some(kind) = update.kind {
            separated.push("file_type = ");
            separated.push_bind_unseparated(kind);
        }
        if let Some(ref hash) = update.hash {
            separated.push("hash = ");
            separated.push_bind_unseparated(hash.clone());
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

    /// Delete a file entry. Returns `false` if no live entry had that ID.
    pub async fn delete(&self, id: i64, mode: DeleteMode) -> Result<bool> {
        let result = match mode {
            DeleteMode::Soft => {
                sqlx::query("UPDATE files SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                    .bind(Utc::now())
                    .bind(id)
                    .execute(self.pool)
                    .await?
            }
            DeleteMode::Hard => {
                sqlx::query("DELETE FROM files WHERE id = ?")
                    .bind(id)
                    .execute(self.pool)
                    .await?
            }
        };

        Ok(result.rows_affected() > 0)
    }

    /// Whether a live file other than `except_id` points at `path`.
    pub async fn path_in_use(&self, path: &str, except_id: i64) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM files WHERE path = ? AND id != ? AND deleted_at IS NULL LIMIT 1",
        )
        .bind(path)
        .bind(except_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// Count file entries, soft-deleted ones included.
    #[cfg(test)]
    pub(crate) async fn count_all(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files")
            .fetch_one(self.pool)
            .await?;

        Ok(count.0)
    }
}

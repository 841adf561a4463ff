//! Database schema and migrations for fileshelf.
//!
//! Migrations are applied sequentially when the database is first opened or
//! upgraded; `schema_version` records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: files table
    r#"
CREATE TABLE files (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL DEFAULT 0,
    name        TEXT NOT NULL,
    path        TEXT NOT NULL,
    src         TEXT NOT NULL DEFAULT '',
    ext         TEXT NOT NULL DEFAULT '',      -- includes the leading dot
    preset      TEXT NOT NULL DEFAULT 'notset',
    size        INTEGER NOT NULL DEFAULT 0,
    status      INTEGER NOT NULL DEFAULT 0,
    file_type   INTEGER NOT NULL DEFAULT 0,
    hash        TEXT NOT NULL DEFAULT '',      -- hex digest of the stored bytes
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT                           -- set by soft delete
);

CREATE INDEX idx_files_user_id ON files(user_id);
CREATE INDEX idx_files_hash ON files(hash);
CREATE INDEX idx_files_path ON files(path);
CREATE INDEX idx_files_deleted_at ON files(deleted_at);
"#,
    // v2: attachments table
    r#"
-- file_id is deliberately not a foreign key: deleting a file leaves
-- attachments pointing at it.
CREATE TABLE attachments (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id      INTEGER NOT NULL DEFAULT 0,
    group_tag    TEXT NOT NULL DEFAULT '',
    file_id      INTEGER NOT NULL DEFAULT 0,
    title        TEXT NOT NULL DEFAULT '',
    description  TEXT NOT NULL DEFAULT '',
    is_main      INTEGER NOT NULL DEFAULT 0,
    hash         TEXT NOT NULL DEFAULT '',
    sort_index   INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    deleted_at   TEXT
);

CREATE INDEX idx_attachments_user_id ON attachments(user_id);
CREATE INDEX idx_attachments_file_id ON attachments(file_id);
CREATE INDEX idx_attachments_group_tag ON attachments(group_tag);
CREATE INDEX idx_attachments_deleted_at ON attachments(deleted_at);
"#,
];

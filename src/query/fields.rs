//! Per-collection field tables for list queries.
//!
//! Every filterable parameter is declared here together with the column it
//! reads and how it matches. Nothing outside these tables ever reaches SQL.

/// How a filter parameter is compared against its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Column equals the value.
    Exact,
    /// Column contains the value (case-sensitive).
    Contains,
    /// Column equals the value read as a boolean (`true`/`false`/`1`/`0`).
    Flag,
}

/// A recognized filter parameter.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Request parameter name.
    pub param: &'static str,
    /// Column the parameter filters on.
    pub column: &'static str,
    /// Match policy.
    pub kind: MatchKind,
}

impl FieldSpec {
    const fn exact(param: &'static str, column: &'static str) -> Self {
        Self {
            param,
            column,
            kind: MatchKind::Exact,
        }
    }

    const fn contains(param: &'static str, column: &'static str) -> Self {
        Self {
            param,
            column,
            kind: MatchKind::Contains,
        }
    }

    const fn flag(param: &'static str, column: &'static str) -> Self {
        Self {
            param,
            column,
            kind: MatchKind::Flag,
        }
    }
}

/// Description of a record collection the list query can run against.
#[derive(Debug)]
pub struct Collection {
    /// Table name.
    pub table: &'static str,
    /// Column list selected for each row.
    pub columns: &'static str,
    /// Recognized filter parameters.
    pub fields: &'static [FieldSpec],
    /// Columns matched by the `all` parameter.
    pub searchable: &'static [&'static str],
    /// Accepted sort keys (lowercase) and the column each one orders by.
    pub sort_keys: &'static [(&'static str, &'static str)],
}

impl Collection {
    /// Look up the column for a sort key, ignoring ASCII case.
    pub fn sort_column(&self, key: &str) -> Option<&'static str> {
        let key = key.to_ascii_lowercase();
        self.sort_keys
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, column)| *column)
    }
}

/// The `files` collection.
pub static FILES: Collection = Collection {
    table: "files",
    columns: "id, user_id, name, path, src, ext, preset, size, status, file_type, hash, \
              created_at, updated_at, deleted_at",
    fields: &[
        FieldSpec::exact("id", "id"),
        FieldSpec::exact("userid", "user_id"),
        FieldSpec::contains("name", "name"),
        FieldSpec::contains("path", "path"),
        FieldSpec::contains("ext", "ext"),
        FieldSpec::exact("preset", "preset"),
        FieldSpec::exact("hash", "hash"),
        FieldSpec::exact("status", "status"),
        FieldSpec::exact("type", "file_type"),
    ],
    searchable: &["id", "name", "path", "ext"],
    sort_keys: &[
        ("id", "id"),
        ("userid", "user_id"),
        ("user_id", "user_id"),
        ("name", "name"),
        ("path", "path"),
        ("ext", "ext"),
        ("preset", "preset"),
        ("hash", "hash"),
        ("size", "size"),
        ("status", "status"),
        ("type", "file_type"),
        ("createdat", "created_at"),
        ("created_at", "created_at"),
        ("updatedat", "updated_at"),
        ("updated_at", "updated_at"),
    ],
};

/// The `attachments` collection.
pub static ATTACHMENTS: Collection = Collection {
    table: "attachments",
    columns: "id, user_id, group_tag, file_id, title, description, is_main, hash, sort_index, \
              created_at, updated_at, deleted_at",
    fields: &[
        FieldSpec::exact("id", "id"),
        FieldSpec::exact("userid", "user_id"),
        FieldSpec::contains("group", "group_tag"),
        FieldSpec::exact("fileid", "file_id"),
        FieldSpec::contains("title", "title"),
        FieldSpec::contains("description", "description"),
        FieldSpec::exact("hash", "hash"),
        FieldSpec::flag("ismain", "is_main"),
    ],
    searchable: &["id", "title", "description", "group_tag"],
    sort_keys: &[
        ("id", "id"),
        ("userid", "user_id"),
        ("user_id", "user_id"),
        ("group", "group_tag"),
        ("fileid", "file_id"),
        ("file_id", "file_id"),
        ("title", "title"),
        ("description", "description"),
        ("hash", "hash"),
        ("ismain", "is_main"),
        ("is_main", "is_main"),
        ("index", "sort_index"),
        ("createdat", "created_at"),
        ("created_at", "created_at"),
        ("updatedat", "updated_at"),
        ("updated_at", "updated_at"),
    ],
};

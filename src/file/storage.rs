//! Content store for uploaded bytes.
//!
//! Uploads are partitioned by owner and by day:
//! ```text
//! {root}/{uploads}/
//! └── {sha256(owner id)}/
//!     └── {unix seconds floored to the day}/
//!         ├── photo.png
//!         └── report.pdf
//! ```
//! The same owner uploading the same filename twice on one day writes to the
//! same location; the newer bytes win. Records sharing a location are the
//! caller's concern: the store never checks before removing bytes.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::metadata::NewFile;
use crate::{Result, ShelfError};

/// Width of a storage time bucket in seconds.
pub const BUCKET_SECONDS: i64 = 24 * 60 * 60;

/// Lowercase hex SHA-256 of a byte stream.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Directory segment for an owner.
pub fn owner_segment(owner_id: i64) -> String {
    content_hash(owner_id.to_string().as_bytes())
}

/// Start of the day bucket containing `now`, in Unix seconds.
pub fn time_bucket(now: DateTime<Utc>) -> i64 {
    let ts = now.timestamp();
    ts - ts.rem_euclid(BUCKET_SECONDS)
}

/// Split a client filename into base name and extension.
///
/// Only the last path component is kept, whichever separator the client
/// used. The extension keeps its leading dot and is empty when absent. A
/// leading dot belongs to the name, so `.bashrc` has no extension.
pub fn split_filename(filename: &str) -> Result<(String, String)> {
    let last = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if last.is_empty() || last == "." || last == ".." {
        return Err(ShelfError::Validation("filename is empty".to_string()));
    }

    let path = Path::new(last);
    let base = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(last)
        .to_string();
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    Ok((base, ext))
}

/// Filesystem side of uploads: writes and removes stored bytes.
#[derive(Debug, Clone)]
pub struct ContentStore {
    /// Directory uploads are written under.
    base_path: PathBuf,
    /// Public URL prefix matching `base_path`.
    public_prefix: String,
}

impl ContentStore {
    /// Create a store writing to `{root}/{uploads_path}`.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl AsRef<Path>, uploads_path: &str) -> Result<Self> {
        let prefix = uploads_path.trim_matches('/');
        let base_path = root.as_ref().join(prefix);
        fs::create_dir_all(&base_path)?;
        let base_path = base_path.canonicalize()?;

        debug!("Content store at {:?}", base_path);

        Ok(Self {
            base_path,
            public_prefix: format!("/{prefix}"),
        })
    }

    /// Directory uploads are written under.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Public URL prefix for stored files.
    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Write bytes for `owner_id` and describe them.
    pub fn store(&self, bytes: &[u8], filename: &str, owner_id: i64) -> Result<NewFile> {
        self.store_at(bytes, filename, owner_id, Utc::now())
    }

    /// Write bytes into the bucket for `now`.
    pub fn store_at(
        &self,
        bytes: &[u8],
        filename: &str,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<NewFile> {
        let (base, ext) = split_filename(filename)?;
        let owner_seg = owner_segment(owner_id);
        let bucket = time_bucket(now).to_string();
        let stored_name = format!("{base}{ext}");

        let dir = self.base_path.join(&owner_seg).join(&bucket);
        fs::create_dir_all(&dir)?;

        let path = dir.join(&stored_name);
        fs::write(&path, bytes)?;

        let hash = content_hash(bytes);
        info!(owner_id, size = bytes.len(), path = %path.display(), "stored upload");

        Ok(NewFile::new(
            owner_id,
            base,
            ext,
            path.to_string_lossy().into_owned(),
            bytes.len() as i64,
            hash,
        )
        .with_src(format!(
            "{}/{owner_seg}/{bucket}/{stored_name}",
            self.public_prefix
        )))
    }

    /// Remove stored bytes. Fails when `path` does not exist.
    pub fn delete(&self, path: &str) -> Result<()> {
        fs::remove_file(path)?;
        info!(path, "removed stored upload");
        Ok(())
    }
}

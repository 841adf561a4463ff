//! Stored files and their attachments.
//!
//! This module provides:
//! - The content store writing uploaded bytes to disk
//! - File metadata records and repository
//! - Attachment records binding a file to a titled, grouped context

mod attachment;
mod metadata;
mod storage;

pub use attachment::{Attachment, AttachmentRepository, AttachmentUpdate, NewAttachment};
pub use metadata::{File, FileRepository, FileUpdate, NewFile, DEFAULT_PRESET};
pub use storage::{
    content_hash, owner_segment, split_filename, time_bucket, ContentStore, BUCKET_SECONDS,
};

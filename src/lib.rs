//! fileshelf - file ingestion and metadata service
//!
//! Stores uploaded bytes under a deterministic owner/day layout, records
//! their metadata, binds them to titled attachments, and serves filtered
//! listings of both over HTTP.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod query;
pub mod service;
pub mod web;

pub use auth::{authorize, Action, Caller, Role};
pub use config::Config;
pub use db::{Database, DeleteMode};
pub use error::{Result, ShelfError};
pub use file::{Attachment, ContentStore, File};
pub use service::{AttachmentService, Envelope, ErrorMsg, FileService};

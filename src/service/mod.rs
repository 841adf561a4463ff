//! Record services.
//!
//! Services sequence the content store, list queries and ownership checks
//! around the repositories. Request-level failures (not found, not owner,
//! I/O, invalid input) are reported in the returned [`Envelope`]; only
//! infrastructure failures come back as `Err`.

mod attachment;
mod envelope;
mod file;

pub use attachment::AttachmentService;
pub use envelope::{Envelope, ErrorMsg};
pub use file::{FilePatch, FileService, Upload};

use crate::ShelfError;

/// Error field for lookups and attachment ownership.
pub const FIELD_ID: &str = "ID";
/// Error field for upload, I/O and file ownership failures.
pub const FIELD_FILE: &str = "file";
/// Error field for unreadable request bodies.
pub const FIELD_BODY: &str = "body";

/// Message shown to clients for a request-level error.
pub(crate) fn client_message(err: &ShelfError) -> String {
    match err {
        ShelfError::Validation(msg) | ShelfError::Permission(msg) | ShelfError::Auth(msg) => {
            msg.clone()
        }
        ShelfError::Io(e) => e.to_string(),
        other => other.to_string(),
    }
}

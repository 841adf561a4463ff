//! Request bodies for attachment routes.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::validation::TextFields;
use crate::file::{AttachmentUpdate, NewAttachment};

/// A boolean that clients may also send as `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    pub fn as_bool(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(n) => n != 0,
        }
    }
}

/// Body of `POST /api/attachments`.
///
/// The owner is always the authenticated caller; any `userID` in the body
/// is ignored.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttachmentRequest {
    #[serde(rename = "fileID")]
    pub file_id: i64,
    #[serde(default)]
    #[validate(length(max = 64, message = "Group must not exceed 64 characters"))]
    pub group: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "Title must not exceed 255 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[schema(value_type = Option<bool>)]
    pub is_main: Option<Flag>,
    /// Copied from the referenced file when empty.
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub index: i64,
}

impl TextFields for CreateAttachmentRequest {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("group", self.group.as_str()), ("title", self.title.as_str())]
    }
}

impl From<CreateAttachmentRequest> for NewAttachment {
    fn from(req: CreateAttachmentRequest) -> Self {
        NewAttachment::new(req.file_id, req.group, req.title)
            .with_description(req.description)
            .with_main(req.is_main.is_some_and(Flag::as_bool))
            .with_hash(req.hash)
            .with_index(req.index)
    }
}

/// Body of `PATCH /api/attachments/:id`. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttachmentRequest {
    #[serde(default, rename = "fileID")]
    pub file_id: Option<i64>,
    #[serde(default)]
    #[validate(length(max = 64, message = "Group must not exceed 64 characters"))]
    pub group: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255, message = "Title must not exceed 255 characters"))]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<bool>)]
    pub is_main: Option<Flag>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub index: Option<i64>,
}

impl TextFields for UpdateAttachmentRequest {
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = Vec::new();
        if let Some(group) = &self.group {
            fields.push(("group", group.as_str()));
        }
        if let Some(title) = &self.title {
            fields.push(("title", title.as_str()));
        }
        fields
    }
}

impl From<UpdateAttachmentRequest> for AttachmentUpdate {
    fn from(req: UpdateAttachmentRequest) -> Self {
        AttachmentUpdate {
            group: req.group,
            file_id: req.file_id,
            title: req.title,
            description: req.description,
            is_main: req.is_main.map(Flag::as_bool),
            hash: req.hash,
            index: req.index,
        }
    }
}

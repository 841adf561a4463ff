//! Response envelope carrying data plus field-level errors.

use serde::Serialize;
use utoipa::ToSchema;

/// A field-level error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ErrorMsg {
    /// Field the error refers to (`ID`, `file`, `body`, or an attribute name).
    pub field: String,
    pub message: String,
}

/// `{errors, data}` wrapper returned by every record operation.
///
/// `errors` is always serialized, empty when the operation went through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub errors: Vec<ErrorMsg>,
    pub data: Option<T>,
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self {
            errors: Vec::new(),
            data: None,
        }
    }
}

impl<T> Envelope<T> {
    /// An empty envelope.
    pub fn new() -> Self {
        Self::default()
    }

    /// An envelope carrying `data` and no errors.
    pub fn ok(data: T) -> Self {
        Self {
            errors: Vec::new(),
            data: Some(data),
        }
    }

    /// An envelope carrying a single error and no data.
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut envelope = Self::new();
        envelope.add_error(field, message);
        envelope
    }

    /// Record an error.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ErrorMsg {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Set the data.
    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    /// Whether any error has been recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

//! JSON bodies whose failures are reported inside the envelope.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::service::{Envelope, FIELD_BODY};

/// String attributes checked for control characters.
pub trait TextFields {
    fn text_fields(&self) -> Vec<(&'static str, &str)>;
}

/// A JSON extractor that validates the request body.
///
/// An unreadable body is rejected with a `body` error, a failed field check
/// with one error per field. Both rejections are envelopes sent with HTTP 200.
pub struct EnvelopeJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for EnvelopeJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + TextFields,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = Json<Envelope<()>>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!("rejected request body: {}", e);
            Json(Envelope::error(FIELD_BODY, e.body_text()))
        })?;

        let envelope = check(&value);
        if envelope.has_errors() {
            return Err(Json(envelope));
        }

        Ok(EnvelopeJson(value))
    }
}

/// Run derive validations and control-character checks.
pub fn check<T: Validate + TextFields>(value: &T) -> Envelope<()> {
    let mut envelope = Envelope::new();

    if let Err(errors) = value.validate() {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        for (field, field_errors) in fields {
            for e in field_errors {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                envelope.add_error(field.to_string(), message);
            }
        }
    }

    for (field, text) in value.text_fields() {
        if no_control_chars(text).is_err() {
            envelope.add_error(field, "Must not contain control characters");
        }
    }

    envelope
}

/// Validate that a string does not contain control characters or NULL bytes.
pub fn no_control_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value.chars().any(char::is_control) {
        return Err(validator::ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}

//! Data Transfer Objects for Web API.

pub mod request;
pub mod validation;

pub use request::*;
pub use validation::{check, EnvelopeJson, TextFields};

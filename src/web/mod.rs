//! HTTP boundary.
//!
//! Routes record operations to the services, turns bearer tokens into
//! callers, and serves stored bytes and the OpenAPI document.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;

//! Middleware for Web API.

pub mod auth;
pub mod cors;

pub use auth::{jwt_auth, AuthCaller, JwtClaims, JwtState};
pub use cors::create_cors_layer;

//! JWT caller extraction.
//!
//! Tokens are issued elsewhere; this module only verifies them and turns
//! their claims into a [`Caller`].

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{Caller, Role};
use crate::web::error::ApiError;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (caller identity).
    pub sub: String,
    /// Caller role (`admin`, `user`, ...).
    pub role: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
}

impl JwtClaims {
    /// The caller these claims describe.
    pub fn caller(&self) -> Caller {
        Caller::new(self.sub.clone(), Role::from(self.role.as_str()))
    }
}

/// Application state for JWT verification.
#[derive(Clone)]
pub struct JwtState {
    /// Decoding key for JWT verification.
    pub decoding_key: DecodingKey,
    /// Validation settings.
    pub validation: Validation,
}

impl JwtState {
    /// Create a new JWT state from a secret key.
    pub fn new(secret: &str) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            decoding_key,
            validation,
        }
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, ApiError> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                ApiError::unauthorized("Invalid or expired token")
            })
    }
}

/// Extractor for callers allowed to mutate records.
///
/// Rejects with 401 when no valid bearer token is present and with 403
/// when the token's role is neither `admin` nor `user`.
#[derive(Debug, Clone)]
pub struct AuthCaller(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for AuthCaller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

        // Set by the jwt_auth middleware.
        let jwt_state = parts
            .extensions
            .get::<Arc<JwtState>>()
            .ok_or_else(|| ApiError::internal("JWT state not configured"))?;

        let caller = jwt_state.verify(token)?.caller();

        if !caller.role.can_mutate() {
            return Err(ApiError::forbidden("Role may not modify records"));
        }

        Ok(AuthCaller(caller))
    }
}

/// Middleware function to inject JWT state into request extensions.
pub async fn jwt_auth(
    jwt_state: Arc<JwtState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}

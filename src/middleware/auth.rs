// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT identity middleware.
//!
//! Session tokens are issued by the external identity provider and signed
//! with the shared HS256 key. Anonymous requests pass through; handlers
//! decide what an anonymous caller may do via [`Caller`].

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "scooter_session";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity provider principal)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated identity extracted from JWT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub principal: String,
}

/// Resolve the caller identity if a token is present.
///
/// A token that is present but invalid is rejected outright rather than
/// silently downgraded to anonymous.
pub async fn resolve_identity(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        Some(cookie.value().to_string())
    } else {
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
    };

    if let Some(token) = token {
        match verify_jwt(&token, &state.config.jwt_signing_key) {
            Some(auth_user) => {
                request.extensions_mut().insert(auth_user);
            }
            None => return AppError::InvalidToken.into_response(),
        }
    }

    next.run(request).await
}

/// Decode and validate a session token.
pub fn verify_jwt(token: &str, signing_key: &[u8]) -> Option<AuthUser> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).ok()?;
    let principal = token_data.claims.sub.trim();
    if principal.is_empty() {
        return None;
    }

    Some(AuthUser {
        principal: principal.to_string(),
    })
}

/// Create a JWT for a principal (used by tooling and tests).
pub fn create_jwt(principal: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: principal.to_string(),
        iat: now,
        exp: now + 7 * 24 * 60 * 60, // 7 days
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// The identity behind a request, if any.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<AuthUser>);

impl Caller {
    /// The authenticated identity, or `login_required` carrying `message`.
    pub fn require(self, message: &str) -> Result<AuthUser, AppError> {
        self.0.ok_or_else(|| AppError::login_required(message))
    }

    pub fn principal(&self) -> Option<&str> {
        self.0.as_ref().map(|u| u.principal.as_str())
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(parts.extensions.get::<AuthUser>().cloned()))
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes. Sign-in happens at the identity provider; this service
//! only clears the session cookie.

use crate::middleware::auth::SESSION_COOKIE;
use crate::AppState;
use axum::{http::StatusCode, routing::post, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/logout", post(logout))
}

/// Expire the session cookie. Clients holding a bearer token drop it locally.
async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let expired = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO);

    (jar.add(expired), StatusCode::NO_CONTENT)
}

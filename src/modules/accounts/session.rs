//! Request-scoped identity.
//!
//! Handlers that need a signed-in user take [`CurrentUser`] as an argument;
//! there is no ambient "current user" anywhere else.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, Uri},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use super::models::User;
use super::store;
use shelf_authz::UserId;
use shelf_http::AppError;
use shelf_kernel::{settings::AuthSettings, AppState};

/// The signed-in user making this request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = &state.settings().auth;
        let jar = CookieJar::from_headers(&parts.headers);

        let user = match jar.get(&auth.session_cookie) {
            Some(cookie) => store::user_for_session(&state.db, cookie.value())
                .await
                .map_err(|e| AppError::from(e).into_response())?,
            None => None,
        };

        match user {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                tracing::debug!(path = %parts.uri.path(), "login required");
                Err(login_redirect(&auth.login_url, &parts.uri).into_response())
            }
        }
    }
}

/// Send the client to the login page, remembering where it was going.
pub fn login_redirect(login_url: &str, uri: &Uri) -> Redirect {
    let next = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => Redirect::to(&format!("{}?{}", login_url, query)),
        Err(_) => Redirect::to(login_url),
    }
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

pub fn session_cookie(auth: &AuthSettings, token: String) -> Cookie<'static> {
    Cookie::build((auth.session_cookie.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(auth.session_ttl_hours))
        .build()
}

pub fn expired_session_cookie(auth: &AuthSettings) -> Cookie<'static> {
    Cookie::build((auth.session_cookie.clone(), "")).path("/").build()
}

//! Request guards for protected routes.
//!
//! Both guards pull a raw token from the request, validate it with the shared
//! [`TokenService`], and either attach an [`AuthenticatedUser`] to the request
//! extensions or short-circuit. They differ only in where the token comes from
//! and how a rejection is reported:
//!
//! - [`require_bearer`]: `Authorization: Bearer`, 401 JSON on failure;
//! - [`require_cookie`]: the session cookie, 303 to the login page on failure.
//!
//! ```ignore
//! let api = Router::new()
//!     .route("/", get(list_books))
//!     .route_layer(middleware::from_fn_with_state(guard.clone(), require_bearer));
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use bookshelf_http::AppError;

use crate::cookie::session_token;
use crate::token::TokenService;

/// Shared state of both guards.
#[derive(Clone)]
pub struct GuardState {
    tokens: Arc<TokenService>,
    login_path: Arc<str>,
}

impl GuardState {
    pub fn new(tokens: Arc<TokenService>, login_path: impl Into<String>) -> Self {
        Self {
            tokens,
            login_path: Arc::from(login_path.into()),
        }
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// An absent or empty token never reaches the token service.
    fn authenticate(&self, token: Option<&str>) -> Option<AuthenticatedUser> {
        let token = token.filter(|t| !t.is_empty())?;
        self.tokens.validate_token(token).ok().map(AuthenticatedUser)
    }
}

/// Identity of the caller on a guarded request.
///
/// Inserted into the request extensions by the guards; handlers take it as
/// an extractor. Extracting it on an unguarded route is a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub u64);

impl AuthenticatedUser {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| AppError::unauthorized("authentication required"))
    }
}

#[derive(Debug)]
pub enum GuardRejection {
    /// API request without a usable bearer token.
    Unauthorized,
    /// Browser request without a usable session; send it to the login page.
    LoginRedirect(Arc<str>),
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            GuardRejection::Unauthorized => {
                let mut response =
                    AppError::unauthorized("missing or invalid bearer token").into_response();
                response
                    .headers_mut()
                    .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            GuardRejection::LoginRedirect(location) => Redirect::to(&location).into_response(),
        }
    }
}

/// Bearer-token guard for JSON routes.
pub async fn require_bearer(
    State(guard): State<GuardState>,
    mut request: Request,
    next: Next,
) -> Result<Response, GuardRejection> {
    let user = guard
        .authenticate(bearer_token(request.headers()))
        .ok_or_else(|| {
            tracing::debug!(path = %request.uri().path(), "bearer authentication failed");
            GuardRejection::Unauthorized
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Session-cookie guard for HTML routes.
pub async fn require_cookie(
    State(guard): State<GuardState>,
    mut request: Request,
    next: Next,
) -> Result<Response, GuardRejection> {
    let jar = CookieJar::from_headers(request.headers());
    let user = guard.authenticate(session_token(&jar)).ok_or_else(|| {
        tracing::debug!(path = %request.uri().path(), "session cookie rejected");
        GuardRejection::LoginRedirect(guard.login_path.clone())
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
}

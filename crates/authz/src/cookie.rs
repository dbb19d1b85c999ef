//! The browser session cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::Duration;

use crate::token::TOKEN_TTL;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "jwt";

/// Session cookie for `token`: HttpOnly, site-wide, lives as long as the token.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(false)
        .path("/")
        .max_age(Duration::seconds(TOKEN_TTL.whole_seconds()))
        .build()
}

/// `jar` with an expired session cookie, whether or not the request sent one.
pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    let mut removal = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .path("/")
        .build();
    removal.make_removal();
    jar.add(removal)
}

/// Session token carried by the request's cookies, if any.
pub fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE).map(|cookie| cookie.value())
}

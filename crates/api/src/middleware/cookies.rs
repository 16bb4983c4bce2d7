//! Credential cookies.
//!
//! Both credentials travel as `HttpOnly; SameSite=Lax; Path=/` cookies so
//! scripts on the page never see them. `Secure` is added when the api is
//! served over https.

use std::time::Duration;

use axum::http::{HeaderMap, header};
use tower_sessions::cookie::{Cookie, SameSite, time};

/// Cookie carrying the short-lived access credential.
pub const ACCESS_COOKIE: &str = "access_token";

/// Cookie carrying the long-lived refresh credential.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Value of the named cookie from the request's `Cookie` headers.
#[must_use]
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_owned())
}

/// A credential cookie living for `max_age`.
#[must_use]
pub fn credential_cookie(name: &'static str, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    let max_age = time::Duration::try_from(max_age).unwrap_or(time::Duration::MAX);
    base(name, value, secure).max_age(max_age).build()
}

/// A cookie instructing the browser to drop `name`.
#[must_use]
pub fn expired_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    let mut cookie = base(name, String::new(), secure).build();
    cookie.make_removal();
    cookie
}

fn base(
    name: &'static str,
    value: String,
    secure: bool,
) -> tower_sessions::cookie::CookieBuilder<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
}

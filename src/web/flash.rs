//! One-shot status messages carried in a cookie across a redirect.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use time::Duration;

const FLASH_COOKIE: &str = "gallerist_flash";

pub fn push(jar: CookieJar, message: &str) -> CookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, URL_SAFE_NO_PAD.encode(message)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Reads the pending message, if any, and clears it.
pub fn take(jar: CookieJar) -> (CookieJar, Option<String>) {
    let message = jar
        .get(FLASH_COOKIE)
        .and_then(|c| URL_SAFE_NO_PAD.decode(c.value()).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok());

    if message.is_none() {
        return (jar, None);
    }

    let cookie = Cookie::build((FLASH_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build();
    (jar.remove(cookie), message)
}

pub fn redirect(jar: CookieJar, message: &str, to: &str) -> Response {
    (push(jar, message), Redirect::to(to)).into_response()
}

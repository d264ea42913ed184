//! Private (encrypted) cookie carrying the signed-in user's access token.

use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use time::Duration;

pub const SESSION_COOKIE: &str = "supaguard_session";

pub fn store_session(
    jar: PrivateCookieJar,
    access_token: &str,
    expires_in_secs: i64,
    secure: bool,
) -> PrivateCookieJar {
    let cookie = Cookie::build(Cookie::new(SESSION_COOKIE, access_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(expires_in_secs.max(0)))
        .build();
    jar.add(cookie)
}

pub fn session_token(jar: &PrivateCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

pub fn clear_session(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(
        Cookie::build(Cookie::new(SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build(),
    )
}

//! One-shot messages carried across a redirect in a private cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};

pub(crate) const COOKIE_FLASH: &str = "flash";

/// Store `message` so that it is shown on the next page that calls [take_flash].
pub(crate) fn set_flash(jar: PrivateCookieJar, message: &str) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_FLASH, message.to_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read the pending flash message, if any, and remove it from the client.
pub(crate) fn take_flash(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<String>) {
    let Some(cookie) = jar.get(COOKIE_FLASH) else {
        return (jar, None);
    };

    let message = cookie.value().to_owned();
    let jar = jar.remove(Cookie::build(COOKIE_FLASH).path("/"));

    (jar, Some(message))
}

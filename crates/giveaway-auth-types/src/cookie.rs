//! Session cookie builders.
//!
//! The cookie carries the raw session token; only its hash is ever stored.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the admin session token.
pub const SESSION_COOKIE: &str = "giveaway_session";

/// Attributes applied to the session cookie.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// `Domain` attribute; host-only cookie when `None`.
    pub domain: Option<String>,
    /// `Secure` attribute. Off only for local development over plain HTTP.
    pub secure: bool,
    /// `Max-Age` in seconds, normally the session TTL.
    pub max_age_secs: i64,
}

/// Set the session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use giveaway_auth_types::cookie::{set_session_cookie, CookieSettings, SESSION_COOKIE};
///
/// let settings = CookieSettings {
///     domain: Some("example.com".to_string()),
///     secure: true,
///     max_age_secs: 3600,
/// };
/// let jar = set_session_cookie(CookieJar::new(), "raw-token".to_string(), &settings);
/// let cookie = jar.get(SESSION_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "raw-token");
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, token: String, settings: &CookieSettings) -> CookieJar {
    jar.add(build(token, settings, Duration::seconds(settings.max_age_secs)))
}

/// Overwrite the session cookie with an empty, immediately expiring one.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use giveaway_auth_types::cookie::{
///     clear_session_cookie, set_session_cookie, CookieSettings, SESSION_COOKIE,
/// };
///
/// let settings = CookieSettings { domain: None, secure: false, max_age_secs: 60 };
/// let jar = set_session_cookie(CookieJar::new(), "t".to_string(), &settings);
/// let jar = clear_session_cookie(jar, &settings);
/// let cookie = jar.get(SESSION_COOKIE).unwrap();
/// assert_eq!(cookie.value(), "");
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// assert_eq!(cookie.domain(), None);
/// ```
pub fn clear_session_cookie(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.add(build(String::new(), settings, Duration::ZERO))
}

fn build(value: String, settings: &CookieSettings, max_age: Duration) -> Cookie<'static> {
    let mut builder = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax);
    if let Some(domain) = &settings.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

//! Session cookie encoding.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

use crate::config::SessionConfig;
use crate::session::context::CookieAction;

/// Reads and writes the cookie carrying the session id.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    path: String,
    secure: bool,
}

impl SessionCookie {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            path: config.cookie_path.clone(),
            secure: config.secure,
        }
    }

    /// Session id sent by the browser, if any.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == self.name && !cookie.value().is_empty())
            .map(|cookie| cookie.value().to_string())
    }

    fn build(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .path(self.path.clone())
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }

    /// `Set-Cookie` header value for `action`, if one is needed.
    pub fn header_for(&self, action: &CookieAction) -> Option<HeaderValue> {
        let cookie = match action {
            CookieAction::Keep => return None,
            CookieAction::Issue(id) => self.build(id.clone()),
            CookieAction::Expire => {
                let mut cookie = self.build(String::new());
                cookie.set_max_age(Duration::ZERO);
                cookie.set_expires(cookie::time::OffsetDateTime::UNIX_EPOCH);
                cookie
            }
        };

        HeaderValue::from_str(&cookie.to_string())
            .map_err(|e| tracing::error!(error = %e, "Session cookie is not a valid header"))
            .ok()
    }

    /// Append the cookie change for `action` to response headers.
    pub fn apply(&self, action: &CookieAction, headers: &mut HeaderMap) {
        if let Some(value) = self.header_for(action) {
            headers.append(SET_COOKIE, value);
        }
    }
}

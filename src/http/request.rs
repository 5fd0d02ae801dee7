//! Request handling and transformation.
//!
//! # Responsibilities
//! - Decode form bodies and query strings
//! - Carry everything a handler may touch (session, params, form, db)
//! - Build views pre-filled with layout data (user, flash messages)
//!
//! # Design Decisions
//! - Repeated form keys keep the last value
//! - A body that is not form-encoded decodes to an empty form

use std::collections::HashMap;

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use serde::Serialize;

use crate::auth::current_user;
use crate::db::Database;
use crate::http::response::View;
use crate::routing::Params;
use crate::session::Session;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Decoded `application/x-www-form-urlencoded` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormData(HashMap<String, String>);

impl FormData {
    pub fn parse(bytes: &[u8]) -> Self {
        match serde_urlencoded::from_bytes::<Vec<(String, String)>>(bytes) {
            Ok(pairs) => Self(pairs.into_iter().collect()),
            Err(e) => {
                tracing::debug!(error = %e, "Undecodable form body ignored");
                Self::default()
            }
        }
    }

    pub fn from_query(query: Option<&str>) -> Self {
        query.map(|q| Self::parse(q.as_bytes())).unwrap_or_default()
    }

    /// Decode a body if the request declares it form-encoded.
    pub fn from_body(headers: &HeaderMap, body: &[u8]) -> Self {
        let is_form = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            Self::parse(body)
        } else {
            Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value for `key`, or `""` when absent.
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Everything a handler works with for one request.
pub struct RequestContext<'a> {
    pub session: &'a mut Session,
    pub db: &'a Database,
    pub params: Params,
    pub form: FormData,
    pub query: FormData,
    pub request_id: String,
}

impl<'a> RequestContext<'a> {
    pub fn new(session: &'a mut Session, db: &'a Database) -> Self {
        Self {
            session,
            db,
            params: Params::new(),
            form: FormData::default(),
            query: FormData::default(),
            request_id: String::new(),
        }
    }

    /// Bound route parameter, or `""` when the route has none by that name.
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).map(String::as_str).unwrap_or("")
    }

    /// A view carrying the layout's data. Consumes pending flash messages.
    pub fn view(&mut self, template: &'static str) -> View {
        let success = self.session.get_flash_message("success_message");
        let error = self.session.get_flash_message("error_message");
        View::new(template)
            .with("user", &current_user(self.session))
            .with("success_message", &success)
            .with("error_message", &error)
    }
}

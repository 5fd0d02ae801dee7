//! Per-request session context.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::session::store::{SessionStore, SessionValues};

/// Key prefix reserved for one-shot flash messages.
pub const FLASH_PREFIX: &str = "flash_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NotStarted,
    Active,
    Destroyed,
}

/// What the response has to do with the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieAction {
    /// Cookie already carries the right id.
    Keep,
    /// Send a cookie for this new id.
    Issue(String),
    /// Expire the cookie the browser holds.
    Expire,
}

/// Session state for one request.
///
/// Loaded from the [`SessionStore`] when started and written back by
/// [`Session::persist`] once the handler is done.
#[derive(Debug)]
pub struct Session {
    store: SessionStore,
    cookie_id: Option<String>,
    id: Option<String>,
    values: SessionValues,
    state: State,
}

impl Session {
    /// A not-yet-started session for the id the browser sent, if any.
    pub fn new(store: SessionStore, cookie_id: Option<String>) -> Self {
        Self {
            store,
            cookie_id,
            id: None,
            values: SessionValues::new(),
            state: State::NotStarted,
        }
    }

    /// Initialize session state. Calling it on an active session is a no-op.
    pub fn start(&mut self) {
        match self.state {
            State::Active => {}
            State::NotStarted => {
                let restored = self
                    .cookie_id
                    .as_deref()
                    .and_then(|id| self.store.load(id).map(|values| (id.to_string(), values)));

                match restored {
                    Some((id, values)) => {
                        self.id = Some(id);
                        self.values = values;
                    }
                    None => self.id = Some(Uuid::new_v4().to_string()),
                }
                self.state = State::Active;
            }
            State::Destroyed => {
                self.id = Some(Uuid::new_v4().to_string());
                self.values.clear();
                self.state = State::Active;
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == State::Active
    }

    /// Current session id, once started.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Store a value under `key`. Starts the session if needed.
    ///
    /// Values that cannot be represented as JSON are stored as `null`.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        self.start();
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Session value not serializable");
            Value::Null
        });
        self.values.insert(key.to_string(), value);
    }

    /// Value under `key`, if present and of type `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .filter(|v| !v.is_null())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Whether `key` holds a non-null value.
    pub fn has(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn clear(&mut self, key: &str) {
        self.values.remove(key);
    }

    /// Destroy all session state and invalidate the session id.
    pub fn clear_all(&mut self) {
        if let Some(id) = self.id.take() {
            self.store.remove(&id);
        }
        if let Some(id) = self.cookie_id.as_deref() {
            self.store.remove(id);
        }
        self.values.clear();
        self.state = State::Destroyed;
    }

    pub fn set_flash_message(&mut self, key: &str, message: impl Into<String>) {
        self.set(&flash_key(key), message.into());
    }

    /// Read a flash message and remove it; a second read returns `None`.
    pub fn get_flash_message(&mut self, key: &str) -> Option<String> {
        let key = flash_key(key);
        let message = self.get(&key);
        self.clear(&key);
        message
    }

    pub fn get_flash_message_or(&mut self, key: &str, default: impl Into<String>) -> String {
        self.get_flash_message(key).unwrap_or_else(|| default.into())
    }

    /// Write the session back to the store and report the cookie change.
    ///
    /// A fresh session that never received a value is not stored and gets
    /// no cookie.
    pub fn persist(self) -> CookieAction {
        match (self.state, self.id) {
            (State::Active, Some(id)) => {
                let is_new = self.cookie_id.as_deref() != Some(id.as_str());
                if is_new && self.values.is_empty() {
                    return if self.cookie_id.is_some() {
                        CookieAction::Expire
                    } else {
                        CookieAction::Keep
                    };
                }
                self.store.save(&id, self.values);
                if is_new {
                    CookieAction::Issue(id)
                } else {
                    CookieAction::Keep
                }
            }
            (State::Destroyed, _) => CookieAction::Expire,
            _ => CookieAction::Keep,
        }
    }
}

fn flash_key(key: &str) -> String {
    format!("{FLASH_PREFIX}{key}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn store() -> SessionStore {
        SessionStore::new(Duration::from_secs(60))
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut session = Session::new(store(), None);
        session.start();
        session.set("k", "v");
        let id = session.id().unwrap().to_string();

        session.start();
        assert_eq!(session.id(), Some(id.as_str()));
        assert_eq!(session.get::<String>("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_basic_operations() {
        let mut session = Session::new(store(), None);
        session.start();

        assert!(!session.has("count"));
        assert_eq!(session.get_or("count", 0), 0);

        session.set("count", 3);
        assert!(session.has("count"));
        assert_eq!(session.get::<i64>("count"), Some(3));

        session.clear("count");
        assert!(!session.has("count"));
    }

    #[test]
    fn test_null_value_is_not_present() {
        let mut session = Session::new(store(), None);
        session.set("nothing", Option::<String>::None);
        assert!(!session.has("nothing"));
        assert_eq!(session.get_or("nothing", "fallback".to_string()), "fallback");
    }

    #[test]
    fn test_flash_message_is_read_once() {
        let mut session = Session::new(store(), None);
        session.set_flash_message("success_message", "Saved");

        assert!(session.has("flash_success_message"));
        assert_eq!(session.get_flash_message_or("success_message", "none"), "Saved");
        assert_eq!(session.get_flash_message_or("success_message", "none"), "none");
    }

    #[test]
    fn test_restored_across_requests() {
        let store = store();
        let mut first = Session::new(store.clone(), None);
        first.set("user", "ada");
        let id = first.id().unwrap().to_string();
        assert_eq!(first.persist(), CookieAction::Issue(id.clone()));

        let mut second = Session::new(store.clone(), Some(id.clone()));
        second.start();
        assert_eq!(second.get::<String>("user").as_deref(), Some("ada"));
        assert_eq!(second.persist(), CookieAction::Keep);
    }

    #[test]
    fn test_unknown_cookie_gets_new_id() {
        let mut session = Session::new(store(), Some("stale".into()));
        session.start();
        assert_ne!(session.id(), Some("stale"));

        session.set("k", 1);
        assert!(matches!(session.persist(), CookieAction::Issue(_)));
    }

    #[test]
    fn test_clear_all_destroys_state() {
        let store = store();
        let mut first = Session::new(store.clone(), None);
        first.set("user", "ada");
        let id = first.id().unwrap().to_string();
        first.persist();

        let mut second = Session::new(store.clone(), Some(id.clone()));
        second.start();
        second.clear_all();
        assert!(!second.is_active());
        assert!(!second.has("user"));
        assert_eq!(second.persist(), CookieAction::Expire);
        assert!(store.load(&id).is_none());
    }

    #[test]
    fn test_empty_new_session_is_not_stored() {
        let store = store();
        let mut session = Session::new(store.clone(), None);
        session.start();
        assert_eq!(session.persist(), CookieAction::Keep);
        assert!(store.is_empty());
    }
}

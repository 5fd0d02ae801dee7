//! Login state and per-resource ownership checks.

use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Session key holding the logged-in user.
pub const USER_KEY: &str = "user";

/// The logged-in user as kept in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Whether the session holds a logged-in user.
pub fn is_authenticated(session: &Session) -> bool {
    session.has(USER_KEY)
}

/// The logged-in user, if any.
pub fn current_user(session: &Session) -> Option<SessionUser> {
    session.get(USER_KEY)
}

/// Id of the logged-in user. Ids stored as numeric strings are accepted.
pub fn current_user_id(session: &Session) -> Option<i64> {
    let user: serde_json::Value = session.get(USER_KEY)?;
    match user.get("id")? {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whether the logged-in user owns a resource. False when nobody is logged in.
pub fn is_owner(session: &Session, resource_owner_id: i64) -> bool {
    current_user_id(session) == Some(resource_owner_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use serde_json::json;
    use std::time::Duration;

    fn session() -> Session {
        let mut session = Session::new(SessionStore::new(Duration::from_secs(60)), None);
        session.start();
        session
    }

    fn user(id: i64) -> SessionUser {
        SessionUser {
            id,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            city: Some("London".into()),
            state: None,
        }
    }

    #[test]
    fn test_not_owner_without_user() {
        let session = session();
        assert!(!is_authenticated(&session));
        assert!(!is_owner(&session, 1));
    }

    #[test]
    fn test_owner_matches_id() {
        let mut session = session();
        session.set(USER_KEY, user(7));
        assert!(is_authenticated(&session));
        assert!(is_owner(&session, 7));
        assert!(!is_owner(&session, 8));
        assert_eq!(current_user(&session), Some(user(7)));
    }

    #[test]
    fn test_string_id_is_coerced() {
        let mut session = session();
        session.set(USER_KEY, json!({"id": "7", "name": "Ada"}));
        assert!(is_owner(&session, 7));
    }

    #[test]
    fn test_user_without_id_is_not_owner() {
        let mut session = session();
        session.set(USER_KEY, json!({"name": "Ada"}));
        assert!(!is_owner(&session, 0));
    }
}

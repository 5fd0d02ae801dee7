//! Named route policies.

use std::fmt;

/// A precondition a route declares by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Only for visitors who are not logged in.
    Guest,
    /// Only for logged-in users.
    Auth,
    /// A name no policy is registered for.
    Unknown(String),
}

impl Policy {
    pub fn from_name(name: &str) -> Self {
        match name {
            "guest" => Policy::Guest,
            "auth" => Policy::Auth,
            other => Policy::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Policy::Guest => "guest",
            Policy::Auth => "auth",
            Policy::Unknown(name) => name,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

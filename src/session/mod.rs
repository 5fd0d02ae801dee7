//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Request start:
//!     Cookie header → cookie.rs (read session id)
//!     → context.rs Session::start (load values from store.rs or mint id)
//!
//! Handler:
//!     Session::{set, get, has, clear, clear_all, flash messages}
//!
//! Request end:
//!     Session::persist → store.rs (write back, last write wins)
//!     → cookie.rs (Set-Cookie: issue or expire)
//! ```
//!
//! # Design Decisions
//! - The session is an explicit value owned by the request, never global
//! - Server-side values only; the cookie carries nothing but the id
//! - Flash messages live under the `flash_` prefix and are removed on read

pub mod context;
pub mod cookie;
pub mod store;

pub use context::{CookieAction, Session, FLASH_PREFIX};
pub use self::cookie::SessionCookie;
pub use store::{SessionStore, SessionValues};

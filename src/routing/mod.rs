//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, form body)
//!     → matcher.rs (effective method via `_method`)
//!     → router.rs (scan routes in registration order)
//!     → matcher.rs (segment-by-segment comparison, bind `{params}`)
//!     → Return: matched Route + Params, or NoMatch
//!
//! Route Registration (at startup):
//!     get/post/put/delete(pattern, handler, middleware)
//!     → pattern.rs (split into literal / placeholder segments)
//!     → Append to table, order preserved
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod matcher;
pub mod pattern;
pub mod router;

pub use matcher::{effective_method, Params, METHOD_OVERRIDE_FIELD};
pub use pattern::{Method, Pattern, Segment};
pub use router::{Route, RouteMatch, Router};

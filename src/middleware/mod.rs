//! Route middleware.
//!
//! # Data Flow
//! ```text
//! Matched route (policy names from registration)
//!     → policy.rs (name → Policy)
//!     → gate.rs (evaluate in order against the session)
//!     → Continue to handler, or Break with a redirect / 403
//! ```

pub mod gate;
pub mod policy;

pub use gate::{Gate, HOME_PATH, LOGIN_PATH};
pub use policy::Policy;

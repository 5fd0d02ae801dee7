//! Route-level policy evaluation.
//!
//! # Responsibilities
//! - Evaluate a matched route's policies in declaration order
//! - Stop at the first policy that refuses, with the outcome to send
//!
//! # Design Decisions
//! - Policies only look at login state, never at which resource is asked
//!   for (ownership is checked by handlers)
//! - Unknown policy names follow `middleware.unknown_policy`; both choices
//!   log a warning so a typo in the route table is visible

use std::ops::ControlFlow;

use crate::auth::is_authenticated;
use crate::config::UnknownPolicy;
use crate::error::AppError;
use crate::http::response::Outcome;
use crate::middleware::policy::Policy;
use crate::session::Session;

/// Where `auth` sends visitors who are not logged in.
pub const LOGIN_PATH: &str = "/auth/login";

/// Where `guest` sends users who are already logged in.
pub const HOME_PATH: &str = "/";

/// Evaluates a route's policies against the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gate {
    unknown: UnknownPolicy,
}

impl Gate {
    pub fn new(unknown: UnknownPolicy) -> Self {
        Self { unknown }
    }

    /// `Continue` when every policy passes, otherwise the outcome to send.
    pub fn check(&self, policies: &[Policy], session: &Session) -> ControlFlow<Outcome> {
        for policy in policies {
            self.check_one(policy, session)?;
        }
        ControlFlow::Continue(())
    }

    fn check_one(&self, policy: &Policy, session: &Session) -> ControlFlow<Outcome> {
        match policy {
            Policy::Guest if is_authenticated(session) => {
                tracing::debug!(policy = %policy, "Logged-in user sent home");
                ControlFlow::Break(Outcome::redirect(HOME_PATH))
            }
            Policy::Auth if !is_authenticated(session) => {
                tracing::debug!(policy = %policy, "Visitor sent to login");
                ControlFlow::Break(Outcome::redirect(LOGIN_PATH))
            }
            Policy::Guest | Policy::Auth => ControlFlow::Continue(()),
            Policy::Unknown(name) => match self.unknown {
                UnknownPolicy::Allow => {
                    tracing::warn!(policy = %name, "Unknown route policy ignored");
                    ControlFlow::Continue(())
                }
                UnknownPolicy::Deny => {
                    tracing::warn!(policy = %name, "Unknown route policy, request denied");
                    ControlFlow::Break(Outcome::Error(AppError::unauthorized(
                        "You are not authorized to view this resource",
                    )))
                }
            },
        }
    }
}

//! Request dispatch.
//!
//! # Responsibilities
//! - Find the route for the effective method and path
//! - Run the route's policies before its handler
//! - Invoke exactly one handler, or answer not-found
//!
//! # Design Decisions
//! - Handlers are values resolved at registration, not names looked up per
//!   request
//! - Handler errors become error outcomes here, once

use std::future::Future;
use std::ops::ControlFlow;
use std::pin::Pin;

use crate::error::AppError;
use crate::http::request::RequestContext;
use crate::http::response::Outcome;
use crate::middleware::Gate;
use crate::routing::{Method, Router};

/// Message for requests no route matches.
pub const NOT_FOUND_MESSAGE: &str = "Resource not found!";

/// Something a route can point at.
pub trait Handler: Send + Sync {
    fn call<'a, 'b>(
        &'a self,
        ctx: &'a mut RequestContext<'b>,
    ) -> impl Future<Output = Result<Outcome, AppError>> + Send + 'a
    where
        'b: 'a;
}

/// A handler's future once erased, so the request future stays `Send`
/// for any handler type.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<Outcome, AppError>> + Send + 'a>>;

/// Result of dispatching one request.
#[derive(Debug)]
pub struct Dispatched<'r> {
    pub outcome: Outcome,
    /// Pattern of the matched route, `None` when nothing matched.
    pub route: Option<&'r str>,
}

impl Dispatched<'_> {
    fn unmatched(outcome: Outcome) -> Self {
        Self { outcome, route: None }
    }
}

/// Routes requests to handlers through the gate.
#[derive(Debug)]
pub struct Dispatcher<H> {
    router: Router<H>,
    gate: Gate,
}

impl<H: Handler> Dispatcher<H> {
    pub fn new(router: Router<H>, gate: Gate) -> Self {
        Self { router, gate }
    }

    /// Handle one request. `method` is `None` when the request's method
    /// (after any override) is not one routes can use.
    pub async fn dispatch(
        &self,
        method: Option<Method>,
        path: &str,
        ctx: &mut RequestContext<'_>,
    ) -> Dispatched<'_> {
        let Some(route_match) = method.and_then(|m| self.router.match_route(m, path)) else {
            tracing::debug!(method = ?method, path, "No route matched");
            return Dispatched::unmatched(Outcome::Error(AppError::not_found(NOT_FOUND_MESSAGE)));
        };

        let route = route_match.route;
        let pattern = route.pattern.as_str();
        tracing::debug!(method = %route.method, pattern, "Route matched");

        let outcome = match self.gate.check(&route.middleware, ctx.session) {
            ControlFlow::Break(outcome) => outcome,
            ControlFlow::Continue(()) => {
                ctx.params = route_match.params;
                let fut: HandlerFuture<'_> = Box::pin(route.handler.call(ctx));
                fut.await.unwrap_or_else(Outcome::Error)
            }
        };

        Dispatched {
            outcome,
            route: Some(pattern),
        }
    }
}

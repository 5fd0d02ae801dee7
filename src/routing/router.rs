//! Route table and lookup.
//!
//! # Responsibilities
//! - Store registered routes in registration order
//! - Look up the first route matching a request
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after startup (shared via Arc without locks)
//! - O(n) scan in registration order; first match wins
//! - No de-duplication or conflict detection: a route identical to an
//!   earlier one is shadowed and never reached
//! - Order is the only precedence rule. `/listings/search` only beats
//!   `/listings/{id}` because it is registered first; reordering the table
//!   silently changes which handler runs

use crate::middleware::Policy;
use crate::routing::matcher::{match_segments, Params};
use crate::routing::pattern::{split_path, Method, Pattern};

/// A registered route.
#[derive(Debug, Clone)]
pub struct Route<H> {
    pub method: Method,
    pub pattern: Pattern,
    pub handler: H,
    pub middleware: Vec<Policy>,
}

/// Outcome of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    pub route: &'a Route<H>,
    pub params: Params,
}

impl<H> RouteMatch<'_, H> {
    pub fn handler(&self) -> &H {
        &self.route.handler
    }
}

/// Ordered route table.
#[derive(Debug, Clone)]
pub struct Router<H> {
    routes: Vec<Route<H>>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Registration order is match order.
    pub fn register(&mut self, method: Method, pattern: &str, handler: H, middleware: &[&str]) -> &mut Self {
        self.routes.push(Route {
            method,
            pattern: Pattern::parse(pattern),
            handler,
            middleware: middleware.iter().map(|name| Policy::from_name(name)).collect(),
        });
        self
    }

    pub fn get(&mut self, pattern: &str, handler: H, middleware: &[&str]) -> &mut Self {
        self.register(Method::Get, pattern, handler, middleware)
    }

    pub fn post(&mut self, pattern: &str, handler: H, middleware: &[&str]) -> &mut Self {
        self.register(Method::Post, pattern, handler, middleware)
    }

    pub fn put(&mut self, pattern: &str, handler: H, middleware: &[&str]) -> &mut Self {
        self.register(Method::Put, pattern, handler, middleware)
    }

    pub fn delete(&mut self, pattern: &str, handler: H, middleware: &[&str]) -> &mut Self {
        self.register(Method::Delete, pattern, handler, middleware)
    }

    /// Find the first route whose method and pattern match.
    pub fn match_route(&self, method: Method, path: &str) -> Option<RouteMatch<'_, H>> {
        let request: Vec<&str> = split_path(path).collect();

        self.routes
            .iter()
            .filter(|route| route.method == method && route.pattern.len() == request.len())
            .find_map(|route| {
                match_segments(&route.pattern, &request).map(|params| RouteMatch { route, params })
            })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_routes() -> Router<&'static str> {
        let mut router = Router::new();
        router
            .get("/", "home", &[])
            .get("/listings", "index", &[])
            .get("/listings/create", "create", &["auth"])
            .get("/listings/edit/{id}", "edit", &["auth"])
            .get("listings/search", "search", &[])
            .get("/listings/{id}", "show", &[])
            .post("/listings", "store", &["auth"])
            .put("/listings/{id}", "update", &["auth"])
            .delete("/listings/{id}", "destroy", &["auth"]);
        router
    }

    #[test]
    fn test_match_binds_params() {
        let router = listing_routes();
        let m = router.match_route(Method::Get, "/listings/42").unwrap();
        assert_eq!(*m.handler(), "show");
        assert_eq!(m.params["id"], "42");
    }

    #[test]
    fn test_edit_route_has_three_segments() {
        let router = listing_routes();
        let m = router.match_route(Method::Get, "/listings/edit/5").unwrap();
        assert_eq!(*m.handler(), "edit");
        assert_eq!(m.params["id"], "5");
        assert_eq!(m.route.middleware, vec![Policy::Auth]);
    }

    #[test]
    fn test_earlier_registration_wins() {
        let router = listing_routes();
        assert_eq!(*router.match_route(Method::Get, "/listings/search").unwrap().handler(), "search");
        assert_eq!(*router.match_route(Method::Get, "/listings/create").unwrap().handler(), "create");

        let mut reversed = Router::new();
        reversed
            .get("/listings/{id}", "show", &[])
            .get("/listings/search", "search", &[]);
        let m = reversed.match_route(Method::Get, "/listings/search").unwrap();
        assert_eq!(*m.handler(), "show");
        assert_eq!(m.params["id"], "search");
    }

    #[test]
    fn test_duplicate_route_is_shadowed() {
        let mut router = Router::new();
        router.get("/a", "first", &[]).get("/a", "second", &[]);
        assert_eq!(router.len(), 2);
        assert_eq!(*router.match_route(Method::Get, "/a").unwrap().handler(), "first");
    }

    #[test]
    fn test_method_must_match() {
        let router = listing_routes();
        assert_eq!(*router.match_route(Method::Delete, "/listings/9").unwrap().handler(), "destroy");
        assert_eq!(*router.match_route(Method::Put, "/listings/9").unwrap().handler(), "update");
        assert!(router.match_route(Method::Delete, "/listings").is_none());
        assert!(router.match_route(Method::Post, "/listings/9").is_none());
    }

    #[test]
    fn test_no_match() {
        let router = listing_routes();
        assert!(router.match_route(Method::Get, "/jobs").is_none());
        assert!(router.match_route(Method::Get, "/listings/edit/5/extra").is_none());
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let router = listing_routes();
        assert_eq!(*router.match_route(Method::Get, "/listings/").unwrap().handler(), "index");
    }
}

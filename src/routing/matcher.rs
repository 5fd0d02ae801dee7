//! Route matching logic.
//!
//! # Responsibilities
//! - Resolve the effective request method (`_method` form override)
//! - Compare request path segments against a compiled pattern
//! - Bind `{name}` placeholders to the request's segment values
//!
//! # Design Decisions
//! - A pattern is only tried when the segment counts are equal
//! - Literal segments are compared exactly (case-sensitive)
//! - No regex, a pairwise walk over segments

use std::collections::HashMap;

use crate::routing::pattern::{Method, Pattern, Segment};

/// Name of the hidden form field that overrides a POST's method.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// Parameters bound from placeholders, keyed by placeholder name.
pub type Params = HashMap<String, String>;

/// Method used for matching.
///
/// A POST carrying `_method` is matched as that field's value uppercased.
/// Returns `None` when the resulting method is not one routes can be
/// registered for, so the request can never match.
pub fn effective_method(actual: &axum::http::Method, override_field: Option<&str>) -> Option<Method> {
    let method = Method::try_from(actual).ok()?;
    match (method, override_field) {
        (Method::Post, Some(value)) => value.trim().to_uppercase().parse().ok(),
        (method, _) => Some(method),
    }
}

/// Match request segments against a pattern, returning bound parameters.
pub fn match_segments(pattern: &Pattern, request: &[&str]) -> Option<Params> {
    if pattern.len() != request.len() {
        return None;
    }

    let mut params = Params::new();
    for (segment, value) in pattern.segments().iter().zip(request) {
        match segment {
            Segment::Literal(literal) if literal == value => {}
            Segment::Literal(_) => return None,
            Segment::Param(name) => {
                params.insert(name.clone(), (*value).to_string());
            }
        }
    }
    Some(params)
}

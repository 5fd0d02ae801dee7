//! Form field checks and allow-listing.

use std::collections::BTreeMap;

use validator::ValidateEmail;

use crate::http::request::FormData;

/// Field name → message, ordered by field for stable output.
pub type FieldErrors = BTreeMap<String, String>;

/// Trimmed text whose length in characters lies within `min..=max`.
pub fn string(value: &str, min: usize, max: usize) -> bool {
    let len = value.trim().chars().count();
    len >= min && len <= max
}

pub fn email(value: &str) -> bool {
    value.trim().validate_email()
}

/// Whether two values are equal once trimmed.
pub fn matches(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

/// Keep only `allowed` fields from a form, trimmed.
pub fn allow_list(form: &FormData, allowed: &[&str]) -> BTreeMap<String, String> {
    allowed
        .iter()
        .filter_map(|field| {
            form.get(field)
                .map(|value| (field.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// "Title is required" for every `required` field that is empty.
pub fn require(values: &BTreeMap<String, String>, required: &[&str]) -> FieldErrors {
    required
        .iter()
        .filter(|field| !values.get(**field).is_some_and(|v| string(v, 1, usize::MAX)))
        .map(|field| (field.to_string(), format!("{} is required", capitalize(field))))
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! HTML views.
//!
//! Templates are compiled into the binary and parsed once at startup.
//! Autoescaping is on for every template, so stored text is emitted
//! escaped at render time.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tera::{Tera, Value};

use crate::auth::SessionUser;
use crate::http::response::View;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("error.html", include_str!("../../templates/error.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("listings/index.html", include_str!("../../templates/listings/index.html")),
    ("listings/show.html", include_str!("../../templates/listings/show.html")),
    ("listings/create.html", include_str!("../../templates/listings/create.html")),
    ("listings/edit.html", include_str!("../../templates/listings/edit.html")),
    ("partials/listing_card.html", include_str!("../../templates/partials/listing_card.html")),
    ("partials/listing_form.html", include_str!("../../templates/partials/listing_form.html")),
    ("partials/search.html", include_str!("../../templates/partials/search.html")),
    ("users/login.html", include_str!("../../templates/users/login.html")),
    ("users/create.html", include_str!("../../templates/users/create.html")),
];

/// Compiled template set.
#[derive(Debug)]
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        tera.register_filter("salary", salary_filter);
        Ok(Self { tera })
    }

    pub fn render(&self, view: &View) -> Result<String, tera::Error> {
        self.tera.render(view.template, &view.context)
    }

    /// The error view for `status`, or plain text if it cannot be rendered.
    /// `user` fills the navigation the same way other pages do.
    pub fn error_page(&self, status: StatusCode, message: &str, user: Option<&SessionUser>) -> Response {
        let view = View::new("error.html")
            .with("status", &status.as_u16())
            .with("message", message)
            .with("user", &user)
            .with("success_message", &Value::Null)
            .with("error_message", &Value::Null)
            .status(status);

        match self.render(&view) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Error view failed to render");
                (status, format!("{} {}", status.as_u16(), message)).into_response()
            }
        }
    }
}

/// `$` followed by the salary rounded to a whole number with thousands
/// separators. Text that is not a number renders as `$0`.
pub fn format_salary(raw: &str) -> String {
    let amount = raw.trim().replace(',', "").parse::<f64>().unwrap_or(0.0);
    let whole = amount.abs().round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if amount < 0.0 && whole > 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn salary_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let formatted = match value {
        Value::String(s) => format_salary(s),
        Value::Number(n) => format_salary(&n.to_string()),
        _ => format_salary(""),
    };
    Ok(Value::String(formatted))
}

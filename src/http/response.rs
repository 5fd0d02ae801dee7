//! Handler outcomes and their HTTP responses.
//!
//! # Responsibilities
//! - Represent what a handler decided: render, redirect, or fail
//! - Turn an outcome into an HTTP response (views rendered here)
//!
//! # Design Decisions
//! - A redirect is a value the handler returns, never an early exit
//! - Redirects use 303 so a POST is followed by a GET
//! - Errors render the shared error view with their status

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Serialize;

use crate::auth::SessionUser;
use crate::error::AppError;
use crate::views::Views;

/// A template and the data to fill it with.
#[derive(Debug, Clone)]
pub struct View {
    pub template: &'static str,
    pub context: tera::Context,
    pub status: StatusCode,
}

impl View {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            context: tera::Context::new(),
            status: StatusCode::OK,
        }
    }

    /// Add a value to the template context.
    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

/// What a handler asks the server to send.
#[derive(Debug)]
pub enum Outcome {
    Rendered(View),
    Redirect(String),
    Error(AppError),
}

impl Outcome {
    pub fn redirect(path: impl Into<String>) -> Self {
        Outcome::Redirect(path.into())
    }

    /// Status code the response will carry.
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Rendered(view) => view.status,
            Outcome::Redirect(_) => StatusCode::SEE_OTHER,
            Outcome::Error(err) => err.status(),
        }
    }

    /// `user` is the logged-in user, shown in the error view's navigation.
    pub fn into_response(self, views: &Views, user: Option<&SessionUser>) -> Response {
        match self {
            Outcome::Rendered(view) => match views.render(&view) {
                Ok(html) => (view.status, Html(html)).into_response(),
                Err(e) => {
                    tracing::error!(template = view.template, error = %e, "Template rendering failed");
                    views.error_page(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.", user)
                }
            },
            Outcome::Redirect(location) => Redirect::to(&location).into_response(),
            Outcome::Error(err) => {
                if err.status().is_server_error() {
                    tracing::error!(error = %err, "Request failed");
                }
                views.error_page(err.status(), &err.public_message(), user)
            }
        }
    }
}

impl From<View> for Outcome {
    fn from(view: View) -> Self {
        Outcome::Rendered(view)
    }
}

impl From<AppError> for Outcome {
    fn from(err: AppError) -> Self {
        Outcome::Error(err)
    }
}

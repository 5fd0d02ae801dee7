//! Job board web application.
//!
//! Listings can be browsed and searched by anyone; registered users post
//! listings and may edit or delete only their own.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod middleware;
pub mod observability;
pub mod routing;
pub mod session;
pub mod views;

pub use config::AppConfig;
pub use error::AppError;
pub use http::HttpServer;

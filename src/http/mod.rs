//! HTTP handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware layers, session load)
//!     → request.rs (decode form and query, build the handler context)
//!     → dispatcher.rs (route match, policy gate, one handler call)
//!     → response.rs (render, redirect, or error page)
//!     → Send to client with the session cookie
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::{Dispatched, Dispatcher, Handler, HandlerFuture, NOT_FOUND_MESSAGE};
pub use request::{FormData, RequestContext, X_REQUEST_ID};
pub use response::{Outcome, View};
pub use server::{build_app, AppState, HttpServer, ServerError};

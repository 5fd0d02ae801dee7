//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the Axum app: one fallback handler feeding the dispatcher
//! - Wire up middleware (request ID, tracing, timeout)
//! - Load the session before dispatch and write its cookie after
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::{self, Action};
use crate::auth::current_user;
use crate::config::AppConfig;
use crate::db::Database;
use crate::http::dispatcher::Dispatcher;
use crate::http::request::{FormData, RequestContext, X_REQUEST_ID};
use crate::middleware::Gate;
use crate::observability::metrics;
use crate::routing::{effective_method, METHOD_OVERRIDE_FIELD};
use crate::session::{Session, SessionCookie, SessionStore};
use crate::views::Views;

/// Route label for requests that matched nothing.
const UNMATCHED_ROUTE: &str = "unmatched";

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to load templates: {0}")]
    Templates(#[from] tera::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher<Action>>,
    pub db: Database,
    pub sessions: SessionStore,
    pub cookie: Arc<SessionCookie>,
    pub views: Arc<Views>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &AppConfig, db: Database) -> Result<Self, ServerError> {
        let gate = Gate::new(config.middleware.unknown_policy);
        Ok(Self {
            dispatcher: Arc::new(Dispatcher::new(app::routes(), gate)),
            db,
            sessions: SessionStore::new(Duration::from_secs(config.session.ttl_secs)),
            cookie: Arc::new(SessionCookie::new(&config.session)),
            views: Arc::new(Views::new()?),
            max_body_bytes: config.listener.max_body_bytes,
        })
    }
}

/// Build the Axum app with all middleware layers.
#[allow(deprecated)]
pub fn build_app(config: &AppConfig, state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id,
        )
    });

    Router::new().fallback(handle).with_state(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(trace)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
    )
}

/// HTTP server for the job board.
pub struct HttpServer {
    router: Router,
    sessions: SessionStore,
    sweep_interval: Duration,
}

impl HttpServer {
    pub fn new(config: &AppConfig, db: Database) -> Result<Self, ServerError> {
        let state = AppState::new(config, db)?;
        let sessions = state.sessions.clone();
        Ok(Self {
            router: build_app(config, state),
            sessions,
            sweep_interval: Duration::from_secs(config.session.ttl_secs.clamp(1, 300)),
        })
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sessions = self.sessions.clone();
        let sweep_interval = self.sweep_interval;
        let sweeper = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            loop {
                ticker.tick().await;
                let evicted = sessions.evict_expired();
                if evicted > 0 {
                    tracing::debug!(evicted, "Expired sessions evicted");
                }
                metrics::record_sessions(sessions.len());
            }
        });

        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        sweeper.abort();

        tracing::info!("HTTP server stopped");
        result
    }
}

/// Every request lands here: decode, load the session, dispatch, respond.
async fn handle(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Request body rejected");
            metrics::record_request(parts.method.as_str(), UNMATCHED_ROUTE, 413, start);
            return state
                .views
                .error_page(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large.", None);
        }
    };

    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let form = FormData::from_body(&parts.headers, &body);
    let method = effective_method(&parts.method, form.get(METHOD_OVERRIDE_FIELD));
    let path = parts.uri.path();

    let mut session = Session::new(state.sessions.clone(), state.cookie.read(&parts.headers));
    session.start();

    let dispatched = {
        let mut ctx = RequestContext::new(&mut session, &state.db);
        ctx.form = form;
        ctx.query = FormData::from_query(parts.uri.query());
        ctx.request_id = request_id;
        state.dispatcher.dispatch(method, path, &mut ctx).await
    };

    let route = dispatched.route.unwrap_or(UNMATCHED_ROUTE);
    let user = current_user(&session);
    let mut response = dispatched.outcome.into_response(&state.views, user.as_ref());

    let cookie_action = session.persist();
    state.cookie.apply(&cookie_action, response.headers_mut());

    let status = response.status();
    tracing::debug!(
        method = %parts.method,
        path,
        route,
        status = status.as_u16(),
        "Request handled"
    );
    metrics::record_request(parts.method.as_str(), route, status.as_u16(), start);

    response
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

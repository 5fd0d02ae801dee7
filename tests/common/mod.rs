//! Shared helpers for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use cookie::Cookie;
use http_body_util::BodyExt;
use tower::ServiceExt;

use job_board::config::AppConfig;
use job_board::db::{named, Database};
use job_board::http::{build_app, AppState};

pub const COOKIE_NAME: &str = "jobboard_session";

/// Configuration backed by a private in-memory database.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.database.max_connections = 1;
    config
}

pub async fn test_db(config: &AppConfig) -> Database {
    Database::connect(&config.database, &config.timeouts).await.unwrap()
}

/// A response with its body read to a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn set_cookie(&self) -> Option<Cookie<'static>> {
        self.headers
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Cookie::parse(v.to_string()).ok())
    }
}

/// The app driven in-process, with a one-cookie browser jar.
pub struct TestClient {
    app: Router,
    pub db: Database,
    session: Option<String>,
}

impl TestClient {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let db = test_db(&config).await;
        let state = AppState::new(&config, db.clone()).unwrap();
        Self {
            app: build_app(&config, state),
            db,
            session: None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_deref()
    }

    pub fn forget_session(&mut self) {
        self.session = None;
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self.request("GET", path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&mut self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = serde_urlencoded::to_string(form).unwrap();
        let request = self
            .request("POST", path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(path);
        match &self.session {
            Some(id) => builder.header(COOKIE, format!("{COOKIE_NAME}={id}")),
            None => builder,
        }
    }

    pub async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        let response = TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        };

        if let Some(cookie) = response.set_cookie() {
            if cookie.name() == COOKIE_NAME {
                let expired = cookie.max_age().is_some_and(|age| age.is_zero());
                self.session = (!expired).then(|| cookie.value().to_string());
            }
        }
        response
    }

    /// Register and stay logged in as `email`.
    pub async fn register(&mut self, name: &str, email: &str) -> TestResponse {
        self.post(
            "/auth/register",
            &[
                ("name", name),
                ("email", email),
                ("city", "Boston"),
                ("state", "MA"),
                ("password", "secret123"),
                ("password_confirmation", "secret123"),
            ],
        )
        .await
    }

    pub async fn logout(&mut self) -> TestResponse {
        self.post("/auth/logout", &[]).await
    }

    /// Post a complete listing and return its id.
    pub async fn create_listing(&mut self, title: &str) -> i64 {
        let response = self.post("/listings", &listing_form(title)).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);

        let rows: Vec<(i64,)> = self
            .db
            .fetch_all(
                "SELECT id FROM listings WHERE title = :title ORDER BY id DESC",
                &named([("title", title)]),
            )
            .await
            .unwrap();
        rows[0].0
    }
}

pub fn listing_form(title: &str) -> Vec<(&str, &str)> {
    vec![
        ("title", title),
        ("description", "Build and ship web services"),
        ("salary", "90000"),
        ("tags", "rust, backend"),
        ("company", "Acme"),
        ("city", "Boston"),
        ("state", "MA"),
        ("email", "jobs@acme.test"),
    ]
}

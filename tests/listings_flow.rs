//! Listing CRUD, ownership and search through the full app.

mod common;

use axum::http::StatusCode;
use tokio::net::TcpListener;

use common::{listing_form, test_config, TestClient};
use job_board::http::{build_app, AppState};

#[tokio::test]
async fn test_create_and_show() {
    let mut client = TestClient::new().await;
    client.register("Ada Lovelace", "ada@example.com").await;

    let id = client.create_listing("Rust Developer").await;

    let index = client.get("/listings").await;
    assert!(index.body.contains("Listing created successfully"));
    assert!(index.body.contains("Rust Developer"));

    // Flash messages are shown once.
    let again = client.get("/listings").await;
    assert!(!again.body.contains("Listing created successfully"));

    let show = client.get(&format!("/listings/{id}")).await;
    assert_eq!(show.status, StatusCode::OK);
    assert!(show.body.contains("$90,000"));
    assert!(show.body.contains(&format!("/listings/edit/{id}")));
}

#[tokio::test]
async fn test_store_requires_fields() {
    let mut client = TestClient::new().await;
    client.register("Ada Lovelace", "ada@example.com").await;

    let response = client
        .post("/listings", &[("title", "  "), ("company", "Acme"), ("user_id", "99")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Title is required"));
    assert!(response.body.contains("Salary is required"));
    assert!(response.body.contains("value=\"Acme\""));

    let rows: Vec<(i64,)> = client
        .db
        .fetch_all("SELECT id FROM listings", &Default::default())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_missing_listing() {
    let mut client = TestClient::new().await;
    for path in ["/listings/404", "/listings/abc"] {
        let response = client.get(path).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert!(response.body.contains("Listing not found."));
    }
}

#[tokio::test]
async fn test_visitor_sees_no_owner_actions() {
    let mut client = TestClient::new().await;
    client.register("Ada Lovelace", "ada@example.com").await;
    let id = client.create_listing("Rust Developer").await;
    client.logout().await;

    let show = client.get(&format!("/listings/{id}")).await;
    assert_eq!(show.status, StatusCode::OK);
    assert!(!show.body.contains(&format!("/listings/edit/{id}")));
}

#[tokio::test]
async fn test_non_owner_cannot_change_listing() {
    let mut client = TestClient::new().await;
    client.register("Ada Lovelace", "ada@example.com").await;
    let id = client.create_listing("Rust Developer").await;
    client.logout().await;

    client.register("Grace Hopper", "grace@example.com").await;
    let path = format!("/listings/{id}");

    let response = client.post(&path, &[("_method", "DELETE")]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(path.as_str()));

    let show = client.get(&path).await;
    assert_eq!(show.status, StatusCode::OK);
    assert!(show.body.contains("You are not authorized to delete this listing"));

    let mut form = listing_form("Hijacked");
    form.push(("_method", "PUT"));
    let response = client.post(&path, &form).await;
    assert_eq!(response.location(), Some(path.as_str()));

    let edit = client.get(&format!("/listings/edit/{id}")).await;
    assert_eq!(edit.location(), Some(path.as_str()));

    let show = client.get(&path).await;
    assert!(show.body.contains("Rust Developer"));
    assert!(!show.body.contains("Hijacked"));
}

#[tokio::test]
async fn test_owner_updates_listing() {
    let mut client = TestClient::new().await;
    client.register("Ada Lovelace", "ada@example.com").await;
    let id = client.create_listing("Rust Developer").await;
    let path = format!("/listings/{id}");

    let edit = client.get(&format!("/listings/edit/{id}")).await;
    assert_eq!(edit.status, StatusCode::OK);
    assert!(edit.body.contains("value=\"Rust Developer\""));

    let mut form = listing_form("Senior Rust Developer");
    form.push(("_method", "PUT"));
    let response = client.post(&path, &form).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some(path.as_str()));

    let show = client.get(&path).await;
    assert!(show.body.contains("Listing updated successfully"));
    assert!(show.body.contains("Senior Rust Developer"));
}

#[tokio::test]
async fn test_owner_update_with_errors_rerenders() {
    let mut client = TestClient::new().await;
    client.register("Ada Lovelace", "ada@example.com").await;
    let id = client.create_listing("Rust Developer").await;

    let response = client
        .post(&format!("/listings/{id}"), &[("_method", "PUT"), ("title", "")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Title is required"));
}

#[tokio::test]
async fn test_owner_deletes_listing() {
    let mut client = TestClient::new().await;
    client.register("Ada Lovelace", "ada@example.com").await;
    let id = client.create_listing("Rust Developer").await;

    let response = client.post(&format!("/listings/{id}"), &[("_method", "DELETE")]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/listings"));

    let index = client.get("/listings").await;
    assert!(index.body.contains("Listing deleted successfully"));
    assert_eq!(client.get(&format!("/listings/{id}")).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_markup_is_escaped() {
    let mut client = TestClient::new().await;
    client.register("Ada Lovelace", "ada@example.com").await;
    let id = client.create_listing("<script>alert(1)</script>").await;

    let show = client.get(&format!("/listings/{id}")).await;
    assert!(!show.body.contains("<script>"));
    assert!(show.body.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn test_search() {
    let mut client = TestClient::new().await;
    client.register("Ada Lovelace", "ada@example.com").await;
    client.create_listing("Rust Developer").await;
    client.create_listing("Barista").await;

    let response = client.get("/listings/search?keywords=developer&location=boston").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Rust Developer"));
    assert!(!response.body.contains("Barista"));

    let response = client.get("/listings/search?keywords=developer&location=Denver").await;
    assert!(response.body.contains("No listings found."));
    // Wildcards typed by the visitor are matched literally.
    for keywords in ["%25", "_"] {
        let response = client.get(&format!("/listings/search?keywords={keywords}")).await;
        assert!(response.body.contains("No listings found."), "keywords={keywords}");
    }
}

#[tokio::test]
async fn test_home_shows_latest_six() {
    let mut client = TestClient::new().await;
    client.register("Ada Lovelace", "ada@example.com").await;
    for n in 1..=7 {
        client.create_listing(&format!("Job Number {n}")).await;
    }

    let home = client.get("/").await;
    assert!(home.body.contains("Job Number 7"));
    assert!(home.body.contains("Job Number 2"));
    assert!(!home.body.contains("Job Number 1<"));
}

#[tokio::test]
async fn test_serves_over_tcp() {
    let config = test_config();
    let db = common::test_db(&config).await;
    let app = build_app(&config, AppState::new(&config, db).unwrap());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let response = reqwest::get(format!("http://{addr}/listings")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.text().await.unwrap().contains("All Jobs"));
}

//! API integration tests
//!
//! These run against a live server (with its database and Redis) listening
//! on localhost:8080 and seeded with an admin account. Run with:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const ADMIN_EMAIL: &str = "admin@athenaeum.org";
const ADMIN_PASSWORD: &str = "admin-password";

/// Helper to get an authenticated admin token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": ADMIN_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create an author and a book, returning the book id
async fn create_book(client: &Client, token: &str, title: &str) -> i64 {
    let response = client
        .post(format!("{}/authors", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "name": format!("Author of {}", title) }))
        .send()
        .await
        .expect("Failed to create author");
    assert_eq!(response.status(), 201);
    let author: Value = response.json().await.expect("Failed to parse author");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "author_id": author["id"]
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse book");
    book["id"].as_i64().expect("No book id")
}

/// Create a member user, returning its id
async fn create_member(client: &Client, token: &str, email: &str) -> i64 {
    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "name": "Test Member",
            "email": email,
            "password": "member-password"
        }))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(response.status(), 201);
    let user: Value = response.json().await.expect("Failed to parse user");
    user["id"].as_i64().expect("No user id")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": ADMIN_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], ADMIN_EMAIL);
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_list_books_requires_auth() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_borrow_return_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "Lifecycle Test Book").await;
    let borrower = create_member(&client, &token, "borrower@athenaeum.org").await;
    let other = create_member(&client, &token, "other@athenaeum.org").await;

    // Borrow by the first member
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .bearer_auth(&token)
        .json(&json!({ "user_id": borrower }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert!(response.status().is_success());

    let book: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(book["is_available"], false);
    assert_eq!(book["borrowed_by"].as_i64(), Some(borrower));
    assert!(book["borrowed_at"].is_string());
    assert!(book["return_by"].is_string());

    // A second borrow of the same book fails and changes nothing
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .bearer_auth(&token)
        .json(&json!({ "user_id": other }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 422);

    // Return by the wrong user fails
    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .bearer_auth(&token)
        .json(&json!({ "user_id": other }))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 422);

    // The loan is still in place
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(book["is_available"], false);
    assert_eq!(book["borrowed_by"].as_i64(), Some(borrower));

    // Return by the borrower clears the loan
    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .bearer_auth(&token)
        .json(&json!({ "user_id": borrower }))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());

    let book: Value = response.json().await.expect("Failed to parse book");
    assert_eq!(book["is_available"], true);
    assert!(book["borrowed_by"].is_null());
    assert!(book["borrowed_at"].is_null());
    assert!(book["return_by"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_borrow_missing_book_is_404() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/books/999999/borrow", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_notifications_listing() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/notifications", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());

    let response = client
        .get(format!("{}/notifications/unread-count", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["unread"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_overdue_listing_requires_librarian() {
    let client = Client::new();
    let admin_token = get_auth_token(&client).await;

    create_member(&client, &admin_token, "plain-member@athenaeum.org").await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "plain-member@athenaeum.org",
            "password": "member-password"
        }))
        .send()
        .await
        .expect("Failed to send login request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let member_token = body["token"].as_str().expect("No token").to_string();

    let response = client
        .get(format!("{}/loans/overdue", BASE_URL))
        .bearer_auth(&member_token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/loans/overdue", BASE_URL))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_stats() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"]["total"].is_number());
    assert!(body["books"]["overdue"].is_number());
    assert!(body["users"]["total"].is_number());
    assert!(body["notifications"]["unread"].is_number());
}

//! End-to-end API tests.
//!
//! Each test builds a full router over a fresh in-memory SQLite database
//! and drives it through `tower::ServiceExt::oneshot`, asserting on
//! status codes and JSON bodies exactly as a client would see them.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use bazaar_api::{build_router, ApiConfig, AppState};
use bazaar_db::{Database, DbConfig};

// =============================================================================
// Harness
// =============================================================================

async fn test_app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let config = ApiConfig {
        jwt_secret: "test-secret".to_string(),
        ..ApiConfig::default()
    };

    build_router(Arc::new(AppState::new(db, config)))
}

async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

/// Sign up a user and return a bearer token for them.
async fn signup_and_login(app: &Router, email: &str, username: &str) -> String {
    let (status, _) = request(
        app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "email": email, "username": username, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    body["access_token"].as_str().unwrap().to_string()
}

/// Create a catalog item and return its id.
async fn create_item(app: &Router, name: &str, price: f64, category: &str, stock: i64) -> String {
    let (status, body) = request(
        app,
        Method::POST,
        "/items",
        None,
        Some(json!({
            "name": name,
            "price": price,
            "category": category,
            "stock_quantity": stock,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    body["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_ok() {
    let app = test_app().await;

    let (status, body) = request(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_signup_returns_user_without_password() {
    let app = test_app().await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({
            "email": "alice@example.com",
            "username": "alice",
            "password": "secret123",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["username"], "alice");
    assert!(body["id"].as_str().is_some());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_signup_rejected() {
    let app = test_app().await;
    signup_and_login(&app, "alice@example.com", "alice").await;

    // Same email, different username
    let (status, body) = request(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({
            "email": "alice@example.com",
            "username": "alice2",
            "password": "secret123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email or username already registered");

    // Same username, different email
    let (status, body) = request(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({
            "email": "alice2@example.com",
            "username": "alice",
            "password": "secret123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email or username already registered");

    // No second account was created: the rejected credentials cannot log in
    let (status, _) = request(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "alice2@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The original account and its single cart are intact
    let (status, body) = request(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = request(&app, Method::GET, "/cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn test_signup_rejects_invalid_input() {
    let app = test_app().await;

    // Malformed email
    let (status, _) = request(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "email": "not-an-email", "username": "alice", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Password too short
    let (status, _) = request(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({ "email": "a@example.com", "username": "alice", "password": "abc" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_issues_bearer_token() {
    let app = test_app().await;
    signup_and_login(&app, "alice@example.com", "alice").await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "secret123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_with_bad_credentials_rejected() {
    let app = test_app().await;
    signup_and_login(&app, "alice@example.com", "alice").await;

    // Wrong password
    let (status, body) = request(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Incorrect email or password");

    // Unknown email gets the same message
    let (status, body) = request(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Incorrect email or password");
}

#[tokio::test]
async fn test_logout_acknowledges() {
    let app = test_app().await;

    let (status, body) = request(&app, Method::POST, "/auth/logout", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully logged out");
}

#[tokio::test]
async fn test_cart_requires_authentication() {
    let app = test_app().await;

    let (status, _) = request(&app, Method::GET, "/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, Method::GET, "/cart", Some("garbage-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_create_and_fetch_item() {
    let app = test_app().await;

    let item_id = create_item(&app, "Wireless Headphones", 199.99, "Electronics", 50).await;

    let (status, body) = request(&app, Method::GET, &format!("/items/{item_id}"), None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Wireless Headphones");
    assert_eq!(body["price"], 199.99);
    assert_eq!(body["category"], "Electronics");
    assert_eq!(body["stock_quantity"], 50);
}

#[tokio::test]
async fn test_missing_item_is_404() {
    let app = test_app().await;

    let (status, body) = request(&app, Method::GET, "/items/no-such-id", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Item not found");
}

#[tokio::test]
async fn test_list_items_with_filters() {
    let app = test_app().await;
    create_item(&app, "Wireless Headphones", 199.99, "Electronics", 50).await;
    create_item(&app, "USB Cable", 9.99, "Electronics", 200).await;
    create_item(&app, "Coffee Mug", 12.50, "Home", 30).await;

    // No filter returns everything
    let (status, body) = request(&app, Method::GET, "/items", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    // Category filter
    let (_, body) = request(&app, Method::GET, "/items?category=Electronics", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Price bounds are inclusive
    let (_, body) = request(
        &app,
        Method::GET,
        "/items?min_price=9.99&max_price=12.50",
        None,
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Substring search on the name
    let (_, body) = request(&app, Method::GET, "/items?search=head", None, None).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Wireless Headphones"]);

    // Filters compose
    let (_, body) = request(
        &app,
        Method::GET,
        "/items?category=Electronics&max_price=10.00",
        None,
        None,
    )
    .await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["USB Cable"]);

    // Pagination
    let (_, body) = request(&app, Method::GET, "/items?skip=1&limit=1", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_categories_are_distinct_and_sorted() {
    let app = test_app().await;
    create_item(&app, "Wireless Headphones", 199.99, "Electronics", 50).await;
    create_item(&app, "USB Cable", 9.99, "Electronics", 200).await;
    create_item(&app, "Coffee Mug", 12.50, "Home", 30).await;

    let (status, body) = request(&app, Method::GET, "/categories", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["Electronics", "Home"]));
}

#[tokio::test]
async fn test_create_item_rejects_negative_price() {
    let app = test_app().await;

    let (status, _) = request(
        &app,
        Method::POST,
        "/items",
        None,
        Some(json!({ "name": "Broken", "price": -1.0, "category": "Test" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_new_user_has_empty_cart() {
    let app = test_app().await;
    let token = signup_and_login(&app, "alice@example.com", "alice").await;

    let (status, body) = request(&app, Method::GET, "/cart", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["total_price"], 0.0);
}

/// 3 units at 199.99 must total exactly 599.97, not 599.9700000000001.
#[tokio::test]
async fn test_add_to_cart_computes_exact_total() {
    let app = test_app().await;
    let token = signup_and_login(&app, "alice@example.com", "alice").await;
    let item_id = create_item(&app, "Wireless Headphones", 199.99, "Electronics", 50).await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/cart/items",
        Some(&token),
        Some(json!({ "item_id": item_id, "quantity": 3 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Item added to cart");
    assert_eq!(body["cart"]["total_items"], 3);
    assert_eq!(body["cart"]["total_price"], 599.97);
    assert_eq!(body["cart"]["items"][0]["quantity"], 3);
    assert_eq!(body["cart"]["items"][0]["subtotal"], 599.97);
}

/// The mutation response must carry the bumped `updated_at`, not the
/// value the cart row had before the mutation.
#[tokio::test]
async fn test_mutation_response_reflects_bumped_timestamp() {
    let app = test_app().await;
    let token = signup_and_login(&app, "alice@example.com", "alice").await;
    let item_id = create_item(&app, "Wireless Headphones", 199.99, "Electronics", 50).await;

    let (_, body) = request(
        &app,
        Method::POST,
        "/cart/items",
        Some(&token),
        Some(json!({ "item_id": item_id, "quantity": 1 })),
    )
    .await;
    let from_response: DateTime<Utc> = body["cart"]["updated_at"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    // A plain read renders whatever the database holds
    let (_, body) = request(&app, Method::GET, "/cart", Some(&token), None).await;
    let from_store: DateTime<Utc> = body["updated_at"].as_str().unwrap().parse().unwrap();
    let created: DateTime<Utc> = body["created_at"].as_str().unwrap().parse().unwrap();

    assert_eq!(from_response, from_store);
    assert!(from_response > created);
}

#[tokio::test]
async fn test_add_merges_into_existing_line() {
    let app = test_app().await;
    let token = signup_and_login(&app, "alice@example.com", "alice").await;
    let item_id = create_item(&app, "Wireless Headphones", 199.99, "Electronics", 50).await;

    for _ in 0..2 {
        let (status, _) = request(
            &app,
            Method::POST,
            "/cart/items",
            Some(&token),
            Some(json!({ "item_id": item_id, "quantity": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = request(&app, Method::GET, "/cart", Some(&token), None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["quantity"], 4);
}

#[tokio::test]
async fn test_add_beyond_stock_rejected_and_cart_unchanged() {
    let app = test_app().await;
    let token = signup_and_login(&app, "alice@example.com", "alice").await;
    let item_id = create_item(&app, "Wireless Headphones", 199.99, "Electronics", 50).await;

    let (status, _) = request(
        &app,
        Method::POST,
        "/cart/items",
        Some(&token),
        Some(json!({ "item_id": item_id, "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // 3 already in the cart; 48 more would make 51 against a stock of 50
    let (status, body) = request(
        &app,
        Method::POST,
        "/cart/items",
        Some(&token),
        Some(json!({ "item_id": item_id, "quantity": 48 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Only 50 items available in stock");

    // The existing line is untouched
    let (_, body) = request(&app, Method::GET, "/cart", Some(&token), None).await;
    assert_eq!(body["items"][0]["quantity"], 3);
}

#[tokio::test]
async fn test_add_rejects_bad_requests() {
    let app = test_app().await;
    let token = signup_and_login(&app, "alice@example.com", "alice").await;
    let in_stock = create_item(&app, "Wireless Headphones", 199.99, "Electronics", 50).await;
    let sold_out = create_item(&app, "Rare Vinyl", 89.99, "Music", 0).await;

    // Zero quantity
    let (status, body) = request(
        &app,
        Method::POST,
        "/cart/items",
        Some(&token),
        Some(json!({ "item_id": in_stock, "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Quantity must be greater than 0");

    // Absurdly large quantity is rejected instead of overflowing
    let (status, _) = request(
        &app,
        Method::POST,
        "/cart/items",
        Some(&token),
        Some(json!({ "item_id": in_stock, "quantity": i64::MAX })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown item
    let (status, body) = request(
        &app,
        Method::POST,
        "/cart/items",
        Some(&token),
        Some(json!({ "item_id": "no-such-id", "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Item not found");

    // Zero stock
    let (status, body) = request(
        &app,
        Method::POST,
        "/cart/items",
        Some(&token),
        Some(json!({ "item_id": sold_out, "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Item is out of stock");
}

#[tokio::test]
async fn test_update_sets_quantity_and_zero_removes() {
    let app = test_app().await;
    let token = signup_and_login(&app, "alice@example.com", "alice").await;
    let item_id = create_item(&app, "Wireless Headphones", 199.99, "Electronics", 50).await;

    request(
        &app,
        Method::POST,
        "/cart/items",
        Some(&token),
        Some(json!({ "item_id": item_id, "quantity": 2 })),
    )
    .await;

    let (status, body) = request(
        &app,
        Method::PUT,
        &format!("/cart/items/{item_id}"),
        Some(&token),
        Some(json!({ "quantity": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["quantity"], 5);
    assert_eq!(body["total_items"], 5);

    // Setting the quantity to zero removes the line
    let (status, body) = request(
        &app,
        Method::PUT,
        &format!("/cart/items/{item_id}"),
        Some(&token),
        Some(json!({ "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total_price"], 0.0);
}

#[tokio::test]
async fn test_update_rejections() {
    let app = test_app().await;
    let token = signup_and_login(&app, "alice@example.com", "alice").await;
    let item_id = create_item(&app, "Wireless Headphones", 199.99, "Electronics", 50).await;

    // Negative quantity
    let (status, body) = request(
        &app,
        Method::PUT,
        &format!("/cart/items/{item_id}"),
        Some(&token),
        Some(json!({ "quantity": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Quantity cannot be negative");

    // Item not in the cart
    let (status, body) = request(
        &app,
        Method::PUT,
        &format!("/cart/items/{item_id}"),
        Some(&token),
        Some(json!({ "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Item not found in cart");

    // Above stock
    request(
        &app,
        Method::POST,
        "/cart/items",
        Some(&token),
        Some(json!({ "item_id": item_id, "quantity": 1 })),
    )
    .await;
    let (status, body) = request(
        &app,
        Method::PUT,
        &format!("/cart/items/{item_id}"),
        Some(&token),
        Some(json!({ "quantity": 51 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Only 50 items available in stock");
}

#[tokio::test]
async fn test_remove_line_and_clear_cart() {
    let app = test_app().await;
    let token = signup_and_login(&app, "alice@example.com", "alice").await;
    let headphones = create_item(&app, "Wireless Headphones", 199.99, "Electronics", 50).await;
    let mug = create_item(&app, "Coffee Mug", 12.50, "Home", 30).await;

    for id in [&headphones, &mug] {
        request(
            &app,
            Method::POST,
            "/cart/items",
            Some(&token),
            Some(json!({ "item_id": id, "quantity": 1 })),
        )
        .await;
    }

    // Remove one line
    let (status, body) = request(
        &app,
        Method::DELETE,
        &format!("/cart/items/{headphones}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item removed from cart");

    let (_, body) = request(&app, Method::GET, "/cart", Some(&token), None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["name"], "Coffee Mug");

    // Removing it again is a 404
    let (status, body) = request(
        &app,
        Method::DELETE,
        &format!("/cart/items/{headphones}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Item not found in cart");

    // Clear the rest; idempotent because the cart itself survives
    for _ in 0..2 {
        let (status, body) =
            request(&app, Method::DELETE, "/cart/items/clear", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Cart cleared successfully");
    }

    let (_, body) = request(&app, Method::GET, "/cart", Some(&token), None).await;
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn test_carts_are_per_user() {
    let app = test_app().await;
    let alice = signup_and_login(&app, "alice@example.com", "alice").await;
    let bob = signup_and_login(&app, "bob@example.com", "bob").await;
    let item_id = create_item(&app, "Wireless Headphones", 199.99, "Electronics", 50).await;

    request(
        &app,
        Method::POST,
        "/cart/items",
        Some(&alice),
        Some(json!({ "item_id": item_id, "quantity": 2 })),
    )
    .await;

    let (_, body) = request(&app, Method::GET, "/cart", Some(&alice), None).await;
    assert_eq!(body["total_items"], 2);

    let (_, body) = request(&app, Method::GET, "/cart", Some(&bob), None).await;
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["items"], json!([]));
}

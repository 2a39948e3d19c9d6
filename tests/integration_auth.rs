mod common;

use axum::http::StatusCode;
use common::{generate_unique_email, test_app};
use serde_json::json;

#[tokio::test]
async fn test_register_login_and_me() {
    let app = test_app();
    let email = generate_unique_email();
    let password = "testpass123";

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": email, "password": password }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], email);
    assert!(body.get("password_hash").is_none());

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": email, "password": password }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["email"], email);
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], email);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app();
    let email = generate_unique_email();
    let payload = json!({ "email": email, "password": "testpass123" });

    let (status, _) = app.post("/api/auth/register", None, payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/api/auth/register", None, payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = test_app();
    let email = generate_unique_email();
    app.post(
        "/api/auth/register",
        None,
        json!({ "email": email, "password": "testpass123" }),
    )
    .await;

    let (wrong_password, wrong_password_body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": email, "password": "wrongpass" }),
        )
        .await;
    let (unknown_user, unknown_user_body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "nonexistent@test.com", "password": "wrongpass" }),
        )
        .await;

    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password_body, unknown_user_body);
}

#[tokio::test]
async fn test_register_validation() {
    let app = test_app();

    let (status, _) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "not-an-email", "password": "testpass123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": generate_unique_email(), "password": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_token_carries_granted_roles() {
    let app = test_app();
    let email = generate_unique_email();
    let password = "testpass123";
    let (_, staff_token) = app.staff();

    let (_, user) = app
        .post("/api/auth/register", None, json!({ "email": email, "password": password }))
        .await;
    let (_, login) = app
        .post("/api/auth/login", None, json!({ "email": email, "password": password }))
        .await;
    let token = login["access_token"].as_str().unwrap().to_string();

    app.post(
        "/api/experts/apply",
        Some(&token),
        json!({ "help_description": "Embedded Rust", "price": 75 }),
    )
    .await;
    let (status, _) = app
        .put("/api/experts/approve", Some(&staff_token), json!({ "expert_id": user["user_id"] }))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, login) = app
        .post("/api/auth/login", None, json!({ "email": email, "password": password }))
        .await;
    let token = login["access_token"].as_str().unwrap().to_string();
    let (_, me) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(me["roles"], json!(["expert"]));
}

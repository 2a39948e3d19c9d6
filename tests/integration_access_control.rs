mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{request, test_app};
use mindflow_auth::create_access_token;
use mindflow_config::JwtConfig;
use std::sync::atomic::Ordering;
use uuid::Uuid;

fn with_authorization(uri: &str, value: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", value)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_missing_credential_is_unauthorized() {
    let app = test_app();

    let (status, body) = app.get("/api/consultations/meetings/as-mentee", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");
}

#[tokio::test]
async fn test_placeholder_tokens_are_unauthorized() {
    let app = test_app();

    for header in ["Bearer null", "Bearer undefined", "Bearer ", "Token abc", "bearer"] {
        let (status, _) = app
            .send(with_authorization("/api/auth/me", header))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {header:?}");
    }
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_unauthorized() {
    let app = test_app();
    let foreign = JwtConfig {
        secret: "some_other_secret".to_string(),
        access_token_expiry: 3600,
    };
    let token = create_access_token(Uuid::new_v4(), "x@test.com", Vec::new(), &foreign).unwrap();

    let (status, _) = app.get("/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_elevated_routes_reject_members_without_grant() {
    let app = test_app();
    let (_, token) = app.member();

    let (status, body) = app
        .get("/api/consultations/applications", Some(&token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied");

    let (status, _) = app.get("/api/experts/applications", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_grant_without_admin_permission_is_forbidden() {
    let app = test_app();
    let (id, token) = app.member();
    app.store.grant_staff(id, &["support"]);

    let (status, _) = app.get("/api/experts/applications", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_permission_is_case_insensitive() {
    let app = test_app();
    let (id, token) = app.member();
    app.store.grant_staff(id, &["Admin"]);

    let (status, _) = app.get("/api/experts/applications", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_staff_lookup_failure_is_server_error() {
    let app = test_app();
    let (_, token) = app.staff();
    app.store.faults.fail_staff_lookups.store(true, Ordering::SeqCst);

    let (status, body) = app.get("/api/experts/applications", Some(&token)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_unknown_status_filter_is_bad_request() {
    let app = test_app();
    let (_, token) = app.staff();

    let (status, _) = app
        .get("/api/experts/applications?status=archived", Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .get("/api/experts/applications?status=", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_public_routes_need_no_credential() {
    let app = test_app();

    let (status, _) = app.get("/api/experts/approved", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(request("GET", "/healthz", None, None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = test_app();
    let request = Request::builder()
        .uri("/healthz")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

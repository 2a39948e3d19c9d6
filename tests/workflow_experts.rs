mod common;

use axum::http::StatusCode;
use common::test_app;
use mindflow::utils::notifier::Notification;
use mindflow_models::{ApplicationStatus, UserId};
use serde_json::json;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_expert_application_lifecycle() {
    let app = test_app();
    let (applicant, applicant_token) = app.member();
    let (_, staff_token) = app.staff();

    let (status, body) = app
        .post(
            "/api/experts/apply",
            Some(&applicant_token),
            json!({ "help_description": "Rust code reviews", "price": 100 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["user_id"], applicant.to_string());
    let submitted_at = body["submitted_at"].clone();
    assert!(submitted_at.is_string());

    let (status, body) = app
        .get("/api/experts/applications?status=pending", Some(&staff_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app
        .put(
            "/api/experts/approve",
            Some(&staff_token),
            json!({ "expert_id": applicant }),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .get("/api/experts/applications?status=approved", Some(&staff_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["status"], "approved");
    assert_eq!(body[0]["submitted_at"], submitted_at);

    let roles = app.store.roles_of(applicant).unwrap();
    assert_eq!(roles, vec!["expert".to_string()]);

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, Notification::ExpertApproved);
}

#[tokio::test]
async fn test_second_decision_conflicts() {
    let app = test_app();
    let (applicant, applicant_token) = app.member();
    let (_, staff_token) = app.staff();

    app.post(
        "/api/experts/apply",
        Some(&applicant_token),
        json!({ "help_description": "Databases", "price": 50 }),
    )
    .await;

    let (status, _) = app
        .put("/api/experts/approve", Some(&staff_token), json!({ "expert_id": applicant }))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .put("/api/experts/reject", Some(&staff_token), json!({ "expert_id": applicant }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("approved"));

    let (status, _) = app
        .put("/api/experts/approve", Some(&staff_token), json!({ "expert_id": applicant }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The role is granted once, not per approval attempt.
    assert_eq!(app.store.roles_of(applicant).unwrap(), vec!["expert".to_string()]);
}

#[tokio::test]
async fn test_reject_sends_rejection_notice() {
    let app = test_app();
    let (applicant, applicant_token) = app.member();
    let (_, staff_token) = app.staff();

    app.post(
        "/api/experts/apply",
        Some(&applicant_token),
        json!({ "help_description": "Career advice", "price": 0 }),
    )
    .await;

    let (status, _) = app
        .put("/api/experts/reject", Some(&staff_token), json!({ "expert_id": applicant }))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.store.roles_of(applicant).unwrap().is_empty());

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, Notification::ExpertRejected);
}

#[tokio::test]
async fn test_decision_on_unknown_application_is_not_found() {
    let app = test_app();
    let (stranger, _) = app.member();
    let (_, staff_token) = app.staff();

    let (status, _) = app
        .put("/api/experts/approve", Some(&staff_token), json!({ "expert_id": stranger }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_application_conflicts() {
    let app = test_app();
    let (_, token) = app.member();
    let body = json!({ "help_description": "Rust", "price": 10 });

    let (status, _) = app.post("/api/experts/apply", Some(&token), body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.post("/api/experts/apply", Some(&token), body).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_application_is_unprocessable() {
    let app = test_app();
    let (_, token) = app.member();

    let (status, _) = app
        .post(
            "/api/experts/apply",
            Some(&token),
            json!({ "help_description": "", "price": -5 }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_approved_directory_filters_by_price() {
    let app = test_app();
    let (_, staff_token) = app.staff();

    for price in [20, 80, 150] {
        let (id, token) = app.member();
        app.post(
            "/api/experts/apply",
            Some(&token),
            json!({ "help_description": "Mentoring", "price": price }),
        )
        .await;
        app.put("/api/experts/approve", Some(&staff_token), json!({ "expert_id": id }))
            .await;
    }
    let (_, pending_token) = app.member();
    app.post(
        "/api/experts/apply",
        Some(&pending_token),
        json!({ "help_description": "Still pending", "price": 50 }),
    )
    .await;

    let (status, body) = app.get("/api/experts/approved", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = app
        .get("/api/experts/approved?min_price=50&max_price=100", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let experts = body.as_array().unwrap();
    assert_eq!(experts.len(), 1);
    assert_eq!(experts[0]["price"], 80);

    let (status, _) = app
        .get("/api/experts/approved?min_price=100&max_price=50", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_price_query_is_json_bad_request() {
    let app = test_app();

    let (status, body) = app.get("/api/experts/approved?min_price=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Invalid query parameters"));
}

#[tokio::test]
async fn test_role_grant_failure_keeps_application_approved() {
    let app = test_app();
    let (applicant, applicant_token) = app.member();
    let (_, staff_token) = app.staff();

    app.post(
        "/api/experts/apply",
        Some(&applicant_token),
        json!({ "help_description": "Systems", "price": 40 }),
    )
    .await;

    app.store.faults.fail_role_updates.store(2, Ordering::SeqCst);
    let (status, body) = app
        .put("/api/experts/approve", Some(&staff_token), json!({ "expert_id": applicant }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");

    let (_, body) = app
        .get("/api/experts/applications?status=approved", Some(&staff_token))
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(
        body[0]["status"],
        serde_json::to_value(ApplicationStatus::Approved).unwrap()
    );
    assert!(app.store.roles_of(applicant).unwrap().is_empty());
}

#[tokio::test]
async fn test_role_grant_retry_recovers() {
    let app = test_app();
    let (applicant, applicant_token) = app.member();
    let (_, staff_token) = app.staff();

    app.post(
        "/api/experts/apply",
        Some(&applicant_token),
        json!({ "help_description": "Systems", "price": 40 }),
    )
    .await;

    app.store.faults.fail_role_updates.store(1, Ordering::SeqCst);
    let (status, _) = app
        .put("/api/experts/approve", Some(&staff_token), json!({ "expert_id": applicant }))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(app.store.roles_of(applicant).unwrap(), vec!["expert".to_string()]);
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_approval() {
    let app = test_app();
    let (applicant, applicant_token) = app.member();
    let (_, staff_token) = app.staff();

    app.post(
        "/api/experts/apply",
        Some(&applicant_token),
        json!({ "help_description": "Go", "price": 30 }),
    )
    .await;

    app.notifier.fail.store(true, Ordering::SeqCst);
    let (status, _) = app
        .put("/api/experts/approve", Some(&staff_token), json!({ "expert_id": applicant }))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_expert_lookup_by_user_id() {
    let app = test_app();
    let (applicant, applicant_token) = app.member();
    let (_, viewer_token) = app.member();

    app.post(
        "/api/experts/apply",
        Some(&applicant_token),
        json!({ "help_description": "Career coaching", "price": 60 }),
    )
    .await;

    let (status, body) = app
        .get(&format!("/api/experts/{}", applicant), Some(&viewer_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], applicant.to_string());
    assert_eq!(body["price"], 60);
    assert_eq!(body["status"], "pending");

    let (status, _) = app
        .get(&format!("/api/experts/{}", UserId::new()), Some(&viewer_token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/experts/not-a-uuid", Some(&viewer_token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get(&format!("/api/experts/{}", applicant), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

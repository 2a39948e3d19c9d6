use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use fake::Fake;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::FirstName;
use http_body_util::BodyExt;
use mindflow::router::init_router;
use mindflow::state::AppState;
use mindflow::store::InMemoryStore;
use mindflow::utils::notifier::RecordingNotifier;
use mindflow_auth::create_access_token;
use mindflow_config::{CorsConfig, JwtConfig};
use mindflow_core::permissions::ADMIN;
use mindflow_models::UserId;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub jwt_config: JwtConfig,
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
    }
}

pub fn test_app() -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let jwt_config = test_jwt_config();

    let state = AppState {
        jwt_config: jwt_config.clone(),
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        experts: store.clone(),
        consultations: store.clone(),
        users: store.clone(),
        notifier: notifier.clone(),
    };

    TestApp {
        router: init_router(state),
        store,
        notifier,
        jwt_config,
    }
}

pub fn generate_unique_email() -> String {
    let name: String = FirstName().fake();
    format!("{}-{}@test.com", name.to_lowercase(), Uuid::new_v4())
}

#[allow(dead_code)]
pub fn fake_questions() -> String {
    Sentence(4..10).fake()
}

#[allow(dead_code)]
impl TestApp {
    pub fn token_for(&self, user_id: UserId, email: &str) -> String {
        create_access_token(user_id.into_inner(), email, Vec::new(), &self.jwt_config)
            .expect("token")
    }

    /// A plain member with a ready-made bearer token.
    pub fn member(&self) -> (UserId, String) {
        let email = generate_unique_email();
        let id = self.store.add_user(&email, &[]);
        (id, self.token_for(id, &email))
    }

    /// A member holding an `admin` staff grant.
    pub fn staff(&self) -> (UserId, String) {
        let (id, token) = self.member();
        self.store.grant_staff(id, &[ADMIN]);
        (id, token)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("GET", uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request("POST", uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request("PUT", uri, token, Some(body))).await
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

//! Access-control gates.
//!
//! Gates are axum middleware attached with `route_layer`, so they run only for
//! matched routes and in a fixed order:
//!
//! 1. [`require_credential`]: verifies the bearer token (401 on failure)
//! 2. [`bind_principal`]: exposes the verified identity to handlers (403 if
//!    no credential was verified)
//! 3. [`require_elevated_permission`]: requires an `admin` staff grant (403
//!    when absent, 500 when the lookup itself fails)
//!
//! Use [`authenticated`] and [`elevated`] to attach them; the helpers add the
//! layers innermost-first so the credential check always runs first.

use axum::{
    Router,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::{Next, from_fn, from_fn_with_state},
    response::Response,
};
use mindflow_auth::resolve_bearer;
use mindflow_core::{AppError, WorkflowError, permissions};
use mindflow_db::StoreError;
use mindflow_models::Principal;
use tracing::{error, warn};

use crate::metrics;
use crate::state::AppState;

/// Identity established by [`require_credential`], not yet bound for handlers.
#[derive(Debug, Clone)]
pub struct VerifiedCredential(pub Principal);

pub async fn require_credential(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let principal = resolve_bearer(header, &state.jwt_config)
        .and_then(Principal::try_from)
        .inspect_err(|_| metrics::track_access_denied("credential"))?;

    req.extensions_mut().insert(VerifiedCredential(principal));
    Ok(next.run(req).await)
}

pub async fn bind_principal(mut req: Request, next: Next) -> Result<Response, AppError> {
    let Some(VerifiedCredential(principal)) = req.extensions_mut().remove::<VerifiedCredential>()
    else {
        metrics::track_access_denied("bind");
        return Err(WorkflowError::Forbidden.into());
    };

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

pub async fn require_elevated_permission(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(user_id) = req.extensions().get::<Principal>().map(|p| p.user_id) else {
        metrics::track_access_denied("elevated");
        return Err(WorkflowError::Forbidden.into());
    };

    match state.users.find_staff_grant(user_id).await {
        Ok(grant) if grant.has_permission(permissions::ADMIN) => Ok(next.run(req).await),
        Ok(_) => {
            warn!(user_id = %user_id, "Staff member lacks admin permission");
            metrics::track_access_denied("elevated");
            Err(WorkflowError::Forbidden.into())
        }
        Err(StoreError::NotFound) => {
            warn!(user_id = %user_id, "User has no staff grant");
            metrics::track_access_denied("elevated");
            Err(WorkflowError::Forbidden.into())
        }
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Staff grant lookup failed");
            Err(WorkflowError::persistence(e).into())
        }
    }
}

/// Credential + bind.
pub fn authenticated(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .route_layer(from_fn(bind_principal))
        .route_layer(from_fn_with_state(state.clone(), require_credential))
}

/// Credential + bind + elevated permission.
pub fn elevated(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    let router = router.route_layer(from_fn_with_state(
        state.clone(),
        require_elevated_permission,
    ));
    authenticated(router, state)
}

/// The principal bound by the gates.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or_else(|| WorkflowError::Forbidden.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use axum::{body::Body, http::StatusCode, routing::get};
    use mindflow_auth::create_access_token;
    use mindflow_config::{CorsConfig, JwtConfig};
    use tower::ServiceExt;

    use super::*;
    use crate::store::InMemoryStore;
    use crate::utils::notifier::RecordingNotifier;

    fn state(store: Arc<InMemoryStore>) -> AppState {
        AppState {
            jwt_config: JwtConfig {
                secret: "gate-test-secret-at-least-32-characters".to_string(),
                access_token_expiry: 600,
            },
            cors_config: CorsConfig {
                allowed_origins: vec![],
            },
            experts: store.clone(),
            consultations: store.clone(),
            users: store,
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    fn request_with(state: &AppState, user_id: mindflow_models::UserId) -> Request {
        let token =
            create_access_token(user_id.into_inner(), "s@example.com", vec![], &state.jwt_config)
                .unwrap();
        Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_elevated_gate_without_principal_is_forbidden() {
        let state = state(Arc::new(InMemoryStore::new()));
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(from_fn_with_state(
                state.clone(),
                require_elevated_permission,
            ))
            .with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_bind_without_credential_is_forbidden() {
        let state = state(Arc::new(InMemoryStore::new()));
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(from_fn(bind_principal))
            .with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_staff_lookup_failure_is_server_error() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.add_user("s@example.com", &[]);
        store.faults.fail_staff_lookups.store(true, Ordering::SeqCst);
        let state = state(store);

        let app = elevated(Router::new().route("/", get(|| async { "ok" })), &state)
            .with_state(state.clone());
        let response = app.oneshot(request_with(&state, user)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_admin_grant_passes_all_gates() {
        let store = Arc::new(InMemoryStore::new());
        let user = store.add_user("s@example.com", &[]);
        store.grant_staff(user, &[permissions::ADMIN]);
        let state = state(store);

        let app = elevated(
            Router::new().route(
                "/",
                get(|CurrentPrincipal(p): CurrentPrincipal| async move { p.email }),
            ),
            &state,
        )
        .with_state(state.clone());
        let response = app.oneshot(request_with(&state, user)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth::authenticated;
use crate::state::AppState;

use super::controller::{login_user, me, register_user};

pub fn init_auth_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .merge(authenticated(Router::new().route("/me", get(me)), state))
}

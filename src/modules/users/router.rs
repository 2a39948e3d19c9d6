use axum::{Router, routing::get};

use crate::middleware::auth::elevated;
use crate::state::AppState;

use super::controller::{get_user, get_users};

pub fn init_users_router(state: &AppState) -> Router<AppState> {
    elevated(
        Router::new()
            .route("/", get(get_users))
            .route("/{user_id}", get(get_user)),
        state,
    )
}

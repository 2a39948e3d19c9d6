use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::auth::{authenticated, elevated};
use crate::state::AppState;

use super::controller::{
    apply_for_expert, approve_expert, get_expert, list_approved_experts,
    list_expert_applications, reject_expert,
};

pub fn init_experts_router(state: &AppState) -> Router<AppState> {
    let public = Router::new().route("/approved", get(list_approved_experts));

    let members = authenticated(
        Router::new()
            .route("/apply", post(apply_for_expert))
            .route("/{user_id}", get(get_expert)),
        state,
    );

    let staff = elevated(
        Router::new()
            .route("/applications", get(list_expert_applications))
            .route("/approve", put(approve_expert))
            .route("/reject", put(reject_expert)),
        state,
    );

    public.merge(members).merge(staff)
}

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth::{authenticated, elevated};
use crate::state::AppState;

use super::controller::{
    already_applied, apply_for_consultation, consultations_as_expert, consultations_as_mentee,
    get_consultation, get_consultation_meetings, list_consultations, meetings_as_expert,
    meetings_as_mentee, reject_consultation, schedule_meeting,
};

pub fn init_consultations_router(state: &AppState) -> Router<AppState> {
    let members = authenticated(
        Router::new()
            .route("/apply", post(apply_for_consultation))
            .route("/already-applied/{expert_id}", get(already_applied))
            .route("/meetings/as-mentee", get(meetings_as_mentee))
            .route("/meetings/as-expert", get(meetings_as_expert))
            .route("/mine/as-mentee", get(consultations_as_mentee))
            .route("/mine/as-expert", get(consultations_as_expert))
            .route("/{id}", get(get_consultation))
            .route("/{id}/meetings", get(get_consultation_meetings)),
        state,
    );

    let staff = elevated(
        Router::new()
            .route("/applications", get(list_consultations))
            .route("/meetings", post(schedule_meeting))
            .route("/{id}/reject", post(reject_consultation)),
        state,
    );

    members.merge(staff)
}

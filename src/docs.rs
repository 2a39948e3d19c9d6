use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use mindflow_models::{
    AlreadyAppliedResponse, ApplicationStatus, ApplyForConsultationDto, ApplyForExpertDto,
    Consultation, DecideExpertDto, ExpertApplication, LoginRequest, LoginResponse, Meeting,
    Principal, RegisterRequest, ScheduleMeetingDto,
};

/// Body of every non-2xx response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::router::health,
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::me,
        crate::modules::experts::controller::list_approved_experts,
        crate::modules::experts::controller::apply_for_expert,
        crate::modules::experts::controller::get_expert,
        crate::modules::experts::controller::list_expert_applications,
        crate::modules::experts::controller::approve_expert,
        crate::modules::experts::controller::reject_expert,
        crate::modules::consultations::controller::apply_for_consultation,
        crate::modules::consultations::controller::already_applied,
        crate::modules::consultations::controller::meetings_as_mentee,
        crate::modules::consultations::controller::meetings_as_expert,
        crate::modules::consultations::controller::consultations_as_mentee,
        crate::modules::consultations::controller::consultations_as_expert,
        crate::modules::consultations::controller::get_consultation,
        crate::modules::consultations::controller::get_consultation_meetings,
        crate::modules::consultations::controller::list_consultations,
        crate::modules::consultations::controller::schedule_meeting,
        crate::modules::consultations::controller::reject_consultation,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
    ),
    components(
        schemas(
            Principal,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ApplicationStatus,
            ExpertApplication,
            ApplyForExpertDto,
            DecideExpertDto,
            Consultation,
            Meeting,
            ApplyForConsultationDto,
            ScheduleMeetingDto,
            AlreadyAppliedResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and the current principal"),
        (name = "Experts", description = "Expert applications and the approved expert directory"),
        (name = "Consultations", description = "Consultation applications and meeting scheduling"),
        (name = "Users", description = "Registered users, visible to staff"),
        (name = "Health", description = "Liveness check")
    ),
    info(
        title = "Mindflow API",
        version = "0.1.0",
        description = "Mentorship marketplace backend: mentees book consultations with vetted experts.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

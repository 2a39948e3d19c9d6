use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mindflow_core::AppError;
use mindflow_models::{
    AlreadyAppliedResponse, ApplyForConsultationDto, Consultation, ConsultationFilterParams,
    ConsultationId, Meeting, Participant, ScheduleMeetingDto, StatusFilter, UserId,
};
use tracing::instrument;

use crate::middleware::auth::CurrentPrincipal;
use crate::modules::consultations::service::ConsultationService;
use crate::state::AppState;
use crate::validator::{QueryParams, ValidatedJson, parse_path_id};

#[utoipa::path(
    post,
    path = "/api/consultations/apply",
    request_body = ApplyForConsultationDto,
    responses(
        (status = 201, description = "Consultation requested", body = Consultation),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error or unknown expert")
    ),
    tag = "Consultations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn apply_for_consultation(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ValidatedJson(dto): ValidatedJson<ApplyForConsultationDto>,
) -> Result<(StatusCode, Json<Consultation>), AppError> {
    let consultation = ConsultationService::apply(
        &state,
        principal.user_id,
        dto.expert_id,
        dto.mentee_questions,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(consultation)))
}

#[utoipa::path(
    get,
    path = "/api/consultations/already-applied/{expert_id}",
    params(("expert_id" = String, Path, description = "Expert user id")),
    responses(
        (status = 200, description = "Whether the caller already requested this expert", body = AlreadyAppliedResponse),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Consultations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn already_applied(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(expert_id): Path<String>,
) -> Result<Json<AlreadyAppliedResponse>, AppError> {
    let expert_id: UserId = parse_path_id(&expert_id, "expert")?;
    let applied = ConsultationService::already_applied(&state, principal.user_id, expert_id).await?;
    Ok(Json(AlreadyAppliedResponse { applied }))
}

#[utoipa::path(
    get,
    path = "/api/consultations/meetings/as-mentee",
    responses(
        (status = 200, description = "Meetings where the caller is the mentee", body = Vec<Meeting>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Consultations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn meetings_as_mentee(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<Vec<Meeting>>, AppError> {
    let meetings =
        ConsultationService::meetings_for(&state, principal.user_id, Participant::Mentee).await?;
    Ok(Json(meetings))
}

#[utoipa::path(
    get,
    path = "/api/consultations/meetings/as-expert",
    responses(
        (status = 200, description = "Meetings where the caller is the expert", body = Vec<Meeting>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Consultations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn meetings_as_expert(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<Vec<Meeting>>, AppError> {
    let meetings =
        ConsultationService::meetings_for(&state, principal.user_id, Participant::Expert).await?;
    Ok(Json(meetings))
}

#[utoipa::path(
    get,
    path = "/api/consultations/mine/as-mentee",
    responses(
        (status = 200, description = "Consultations requested by the caller", body = Vec<Consultation>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Consultations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn consultations_as_mentee(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<Vec<Consultation>>, AppError> {
    let consultations =
        ConsultationService::list_by_participant(&state, principal.user_id, Participant::Mentee)
            .await?;
    Ok(Json(consultations))
}

#[utoipa::path(
    get,
    path = "/api/consultations/mine/as-expert",
    responses(
        (status = 200, description = "Consultations requested from the caller", body = Vec<Consultation>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Consultations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn consultations_as_expert(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<Vec<Consultation>>, AppError> {
    let consultations =
        ConsultationService::list_by_participant(&state, principal.user_id, Participant::Expert)
            .await?;
    Ok(Json(consultations))
}

#[utoipa::path(
    get,
    path = "/api/consultations/{id}",
    params(("id" = String, Path, description = "Consultation id")),
    responses(
        (status = 200, description = "Consultation", body = Consultation),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Consultation not found")
    ),
    tag = "Consultations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_consultation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Consultation>, AppError> {
    let id: ConsultationId = parse_path_id(&id, "consultation")?;
    let consultation = ConsultationService::get(&state, id).await?;
    Ok(Json(consultation))
}

#[utoipa::path(
    get,
    path = "/api/consultations/{id}/meetings",
    params(("id" = String, Path, description = "Consultation id")),
    responses(
        (status = 200, description = "Meetings of the consultation", body = Vec<Meeting>),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Consultations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_consultation_meetings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Meeting>>, AppError> {
    let id: ConsultationId = parse_path_id(&id, "consultation")?;
    let meetings = ConsultationService::meetings(&state, id).await?;
    Ok(Json(meetings))
}

#[utoipa::path(
    get,
    path = "/api/consultations/applications",
    params(ConsultationFilterParams),
    responses(
        (status = 200, description = "Consultations", body = Vec<Consultation>),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin staff grant")
    ),
    tag = "Consultations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_consultations(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ConsultationFilterParams>,
) -> Result<Json<Vec<Consultation>>, AppError> {
    let filter = StatusFilter::parse(params.status.as_deref())?;
    let consultations = ConsultationService::list_by_status(&state, filter).await?;
    Ok(Json(consultations))
}

#[utoipa::path(
    post,
    path = "/api/consultations/meetings",
    request_body = ScheduleMeetingDto,
    responses(
        (status = 201, description = "Meeting scheduled and consultation approved", body = Meeting),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin staff grant"),
        (status = 409, description = "Consultation was rejected"),
        (status = 422, description = "Validation error or unknown consultation")
    ),
    tag = "Consultations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto), fields(consultation_id = %dto.consultation_id))]
pub async fn schedule_meeting(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ScheduleMeetingDto>,
) -> Result<(StatusCode, Json<Meeting>), AppError> {
    let meeting =
        ConsultationService::schedule_meeting(&state, dto.consultation_id, dto.start_time, dto.link)
            .await?;
    Ok((StatusCode::CREATED, Json(meeting)))
}

#[utoipa::path(
    post,
    path = "/api/consultations/{id}/reject",
    params(("id" = String, Path, description = "Consultation id")),
    responses(
        (status = 204, description = "Consultation rejected"),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin staff grant"),
        (status = 404, description = "Consultation not found"),
        (status = 409, description = "Consultation already decided")
    ),
    tag = "Consultations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn reject_consultation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: ConsultationId = parse_path_id(&id, "consultation")?;
    ConsultationService::reject(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

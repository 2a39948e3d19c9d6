use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use mindflow_core::AppError;
use mindflow_models::{
    ApplyForExpertDto, DecideExpertDto, ExpertApplication, ExpertFilter, ExpertFilterParams,
    PriceFilterParams, UserId,
};
use tracing::instrument;

use crate::middleware::auth::CurrentPrincipal;
use crate::modules::experts::service::ExpertService;
use crate::state::AppState;
use crate::validator::{QueryParams, ValidatedJson, parse_path_id};

#[utoipa::path(
    get,
    path = "/api/experts/approved",
    params(PriceFilterParams),
    responses(
        (status = 200, description = "Approved experts", body = Vec<ExpertApplication>),
        (status = 400, description = "Invalid price range")
    ),
    tag = "Experts"
)]
#[instrument(skip(state))]
pub async fn list_approved_experts(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PriceFilterParams>,
) -> Result<Json<Vec<ExpertApplication>>, AppError> {
    let experts = ExpertService::list_approved(&state, params.to_range()?).await?;
    Ok(Json(experts))
}

#[utoipa::path(
    post,
    path = "/api/experts/apply",
    request_body = ApplyForExpertDto,
    responses(
        (status = 201, description = "Application submitted", body = ExpertApplication),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Already applied"),
        (status = 422, description = "Validation error")
    ),
    tag = "Experts",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto), fields(user_id = %principal.user_id))]
pub async fn apply_for_expert(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ValidatedJson(dto): ValidatedJson<ApplyForExpertDto>,
) -> Result<(StatusCode, Json<ExpertApplication>), AppError> {
    let application =
        ExpertService::apply(&state, principal.user_id, dto.help_description, dto.price).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    get,
    path = "/api/experts/{user_id}",
    params(("user_id" = String, Path, description = "Applicant user id")),
    responses(
        (status = 200, description = "Expert application", body = ExpertApplication),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Expert application not found")
    ),
    tag = "Experts",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_expert(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ExpertApplication>, AppError> {
    let user_id: UserId = parse_path_id(&user_id, "user")?;
    let expert = ExpertService::get(&state, user_id).await?;
    Ok(Json(expert))
}

#[utoipa::path(
    get,
    path = "/api/experts/applications",
    params(ExpertFilterParams),
    responses(
        (status = 200, description = "Expert applications", body = Vec<ExpertApplication>),
        (status = 400, description = "Unknown status or invalid price range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin staff grant")
    ),
    tag = "Experts",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_expert_applications(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ExpertFilterParams>,
) -> Result<Json<Vec<ExpertApplication>>, AppError> {
    let filter = ExpertFilter::try_from(&params)?;
    let applications = ExpertService::list_applications(&state, filter).await?;
    Ok(Json(applications))
}

#[utoipa::path(
    put,
    path = "/api/experts/approve",
    request_body = DecideExpertDto,
    responses(
        (status = 204, description = "Application approved and expert role granted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin staff grant"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Application already decided")
    ),
    tag = "Experts",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn approve_expert(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<DecideExpertDto>,
) -> Result<StatusCode, AppError> {
    ExpertService::approve(&state, dto.expert_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/experts/reject",
    request_body = DecideExpertDto,
    responses(
        (status = 204, description = "Application rejected"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin staff grant"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Application already decided")
    ),
    tag = "Experts",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn reject_expert(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<DecideExpertDto>,
) -> Result<StatusCode, AppError> {
    ExpertService::reject(&state, dto.expert_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Consultation application and meeting models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::applications::ApplicationStatus;
use crate::ids::{ConsultationId, MeetingId, UserId};

/// A mentee's request for a consultation with an expert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Consultation {
    pub id: ConsultationId,
    pub expert_id: UserId,
    pub mentee_id: UserId,
    pub mentee_questions: String,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
}

/// A meeting scheduled for a consultation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Meeting {
    pub id: MeetingId,
    pub consultation_id: ConsultationId,
    pub start_time: DateTime<Utc>,
    pub link: String,
}

#[derive(Debug, Clone)]
pub struct NewConsultation {
    pub mentee_id: UserId,
    pub expert_id: UserId,
    pub mentee_questions: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ApplyForConsultationDto {
    pub expert_id: UserId,
    #[validate(length(min = 1, max = 4000))]
    #[schema(example = "How should I structure error handling across crates?")]
    pub mentee_questions: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ScheduleMeetingDto {
    pub consultation_id: ConsultationId,
    pub start_time: DateTime<Utc>,
    #[validate(url, length(max = 2048))]
    #[schema(example = "https://meet.example.com/abc-defg-hij")]
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlreadyAppliedResponse {
    pub applied: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ConsultationFilterParams {
    /// `pending`, `approved` or `rejected`; empty or absent lists every status
    pub status: Option<String>,
}

use chrono::{DateTime, Utc};
use mindflow_core::WorkflowError;
use mindflow_db::StoreError;
use mindflow_models::{
    ApplicationStatus, Consultation, ConsultationId, Decision, Meeting, NewConsultation,
    Participant, StatusFilter, UserId,
};
use tracing::{error, info, instrument, warn};

use crate::metrics;
use crate::modules::applications::{ApplicationKind, decide};
use crate::state::AppState;
use crate::store::ApplicationStatusStore;
use crate::utils::notifier::Notification;

const KIND: ApplicationKind = ApplicationKind::Consultation;

pub struct ConsultationService;

impl ConsultationService {
    #[instrument(skip(state, mentee_questions))]
    pub async fn apply(
        state: &AppState,
        mentee_id: UserId,
        expert_id: UserId,
        mentee_questions: String,
    ) -> Result<Consultation, WorkflowError> {
        if mentee_questions.trim().is_empty() {
            return Err(WorkflowError::validation("mentee_questions must not be empty"));
        }

        let consultation = state
            .consultations
            .insert(NewConsultation {
                mentee_id,
                expert_id,
                mentee_questions,
            })
            .await
            .map_err(|e| match e {
                StoreError::ForeignKeyViolation => {
                    WorkflowError::DanglingReference("Expert does not exist".to_string())
                }
                other => other.into(),
            })?;

        info!(consultation_id = %consultation.id, "Consultation application submitted");
        metrics::track_application_submitted(KIND.as_str());
        Ok(consultation)
    }

    #[instrument(skip(state))]
    pub async fn reject(state: &AppState, id: ConsultationId) -> Result<(), WorkflowError> {
        decide(&*state.consultations, KIND, id, Decision::Reject).await?;
        Ok(())
    }

    /// Records a meeting, approves the consultation, and notifies both participants.
    ///
    /// Steps after the status change are best-effort. A consultation that is
    /// already `Approved` keeps its status and gains another meeting.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::DanglingReference`] if the consultation does not exist
    /// - [`WorkflowError::Conflict`] if it was rejected
    /// - [`WorkflowError::Persistence`] if the meeting was stored but the status
    ///   change failed
    #[instrument(skip(state, link))]
    pub async fn schedule_meeting(
        state: &AppState,
        consultation_id: ConsultationId,
        start_time: DateTime<Utc>,
        link: String,
    ) -> Result<Meeting, WorkflowError> {
        let missing =
            || WorkflowError::DanglingReference("Consultation does not exist".to_string());

        let status = state
            .consultations
            .status_of(consultation_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => missing(),
                other => other.into(),
            })?;
        if status == ApplicationStatus::Rejected {
            return Err(WorkflowError::conflict(
                "Cannot schedule a meeting for a rejected consultation",
            ));
        }

        let meeting = state
            .consultations
            .insert_meeting(consultation_id, start_time, &link)
            .await
            .map_err(|e| match e {
                StoreError::ForeignKeyViolation => missing(),
                other => other.into(),
            })?;

        if status == ApplicationStatus::Pending {
            Self::approve_after_meeting(state, consultation_id, &meeting).await?;
        }

        info!(meeting_id = %meeting.id, "Meeting scheduled");
        metrics::track_meeting_scheduled();

        Self::notify_participants(
            state,
            consultation_id,
            Notification::MeetingScheduled { start_time, link },
        )
        .await;

        Ok(meeting)
    }

    async fn approve_after_meeting(
        state: &AppState,
        consultation_id: ConsultationId,
        meeting: &Meeting,
    ) -> Result<(), WorkflowError> {
        match decide(&*state.consultations, KIND, consultation_id, Decision::Approve).await {
            Ok(_) => Ok(()),
            // Approved concurrently by another scheduler: the meeting still stands.
            Err(WorkflowError::Conflict(_))
                if matches!(
                    state.consultations.status_of(consultation_id).await,
                    Ok(ApplicationStatus::Approved)
                ) =>
            {
                Ok(())
            }
            Err(e) => {
                error!(
                    consultation_id = %consultation_id,
                    meeting_id = %meeting.id,
                    error = %e,
                    "Meeting stored but consultation status not updated"
                );
                Err(match e {
                    persistence @ WorkflowError::Persistence(_) => persistence,
                    other => WorkflowError::persistence(anyhow::anyhow!(
                        "meeting {} stored but status update failed: {}",
                        meeting.id,
                        other
                    )),
                })
            }
        }
    }

    /// Best-effort: nothing here fails the caller.
    async fn notify_participants(
        state: &AppState,
        consultation_id: ConsultationId,
        notification: Notification,
    ) {
        let recipients = match Self::participant_emails(state, consultation_id).await {
            Ok(recipients) => recipients,
            Err(e) => {
                warn!(consultation_id = %consultation_id, error = %e, "Could not load participants for notification");
                metrics::track_notification_failed(notification.kind());
                return;
            }
        };

        if let Err(e) = state.notifier.notify(&recipients, &notification).await {
            warn!(consultation_id = %consultation_id, notification = %notification, error = %e, "Notification failed");
            metrics::track_notification_failed(notification.kind());
        }
    }

    async fn participant_emails(
        state: &AppState,
        consultation_id: ConsultationId,
    ) -> Result<Vec<String>, StoreError> {
        let consultation = state.consultations.get(consultation_id).await?;
        let expert = state.users.find_principal(consultation.expert_id).await?;
        let mentee = state.users.find_principal(consultation.mentee_id).await?;
        Ok(vec![expert.email, mentee.email])
    }

    #[instrument(skip(state))]
    pub async fn get(state: &AppState, id: ConsultationId) -> Result<Consultation, WorkflowError> {
        state.consultations.get(id).await.map_err(|e| match e {
            StoreError::NotFound => KIND.not_found(),
            other => other.into(),
        })
    }

    #[instrument(skip(state))]
    pub async fn list_by_status(
        state: &AppState,
        filter: StatusFilter,
    ) -> Result<Vec<Consultation>, WorkflowError> {
        Ok(state.consultations.list_by_status(filter).await?)
    }

    #[instrument(skip(state))]
    pub async fn list_by_participant(
        state: &AppState,
        user_id: UserId,
        side: Participant,
    ) -> Result<Vec<Consultation>, WorkflowError> {
        Ok(state.consultations.list_by_participant(user_id, side).await?)
    }

    #[instrument(skip(state))]
    pub async fn already_applied(
        state: &AppState,
        mentee_id: UserId,
        expert_id: UserId,
    ) -> Result<bool, WorkflowError> {
        Ok(state.consultations.exists_for(mentee_id, expert_id).await?)
    }

    #[instrument(skip(state))]
    pub async fn meetings(
        state: &AppState,
        id: ConsultationId,
    ) -> Result<Vec<Meeting>, WorkflowError> {
        Ok(state.consultations.list_meetings(id).await?)
    }

    #[instrument(skip(state))]
    pub async fn meetings_for(
        state: &AppState,
        user_id: UserId,
        side: Participant,
    ) -> Result<Vec<Meeting>, WorkflowError> {
        Ok(state.consultations.list_meetings_for(user_id, side).await?)
    }
}

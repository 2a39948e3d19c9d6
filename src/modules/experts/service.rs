use mindflow_core::{WorkflowError, permissions::roles};
use mindflow_db::StoreError;
use mindflow_models::{
    Decision, ExpertApplication, ExpertFilter, NewExpertApplication, PriceRange, UserId,
};
use tracing::{info, instrument, warn};

use crate::metrics;
use crate::modules::applications::{ApplicationKind, approve_and_grant_role, decide};
use crate::state::AppState;
use crate::utils::notifier::Notification;

pub struct ExpertService;

impl ExpertService {
    /// Submits a `Pending` expert application for `user_id`.
    #[instrument(skip(state, help_description))]
    pub async fn apply(
        state: &AppState,
        user_id: UserId,
        help_description: String,
        price: i32,
    ) -> Result<ExpertApplication, WorkflowError> {
        if help_description.trim().is_empty() {
            return Err(WorkflowError::validation("help_description must not be empty"));
        }
        if price < 0 {
            return Err(WorkflowError::validation("price must not be negative"));
        }

        let application = state
            .experts
            .insert(NewExpertApplication {
                user_id,
                help_description,
                price,
            })
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation => {
                    WorkflowError::conflict("Expert application already submitted")
                }
                other => other.into(),
            })?;

        info!("Expert application submitted");
        metrics::track_application_submitted(ApplicationKind::Expert.as_str());
        Ok(application)
    }

    /// Approves the application, grants the `expert` role, then emails the applicant.
    #[instrument(skip(state))]
    pub async fn approve(state: &AppState, expert_id: UserId) -> Result<(), WorkflowError> {
        approve_and_grant_role(
            &*state.experts,
            &*state.users,
            ApplicationKind::Expert,
            expert_id,
            expert_id,
            roles::EXPERT,
        )
        .await?;

        Self::notify_applicant(state, expert_id, Notification::ExpertApproved).await;
        Ok(())
    }

    #[instrument(skip(state))]
    pub async fn reject(state: &AppState, expert_id: UserId) -> Result<(), WorkflowError> {
        decide(
            &*state.experts,
            ApplicationKind::Expert,
            expert_id,
            Decision::Reject,
        )
        .await?;

        Self::notify_applicant(state, expert_id, Notification::ExpertRejected).await;
        Ok(())
    }

    /// A single expert application, whatever its status.
    #[instrument(skip(state))]
    pub async fn get(state: &AppState, user_id: UserId) -> Result<ExpertApplication, WorkflowError> {
        state.experts.get(user_id).await.map_err(|e| match e {
            StoreError::NotFound => ApplicationKind::Expert.not_found(),
            other => other.into(),
        })
    }

    #[instrument(skip(state))]
    pub async fn list_applications(
        state: &AppState,
        filter: ExpertFilter,
    ) -> Result<Vec<ExpertApplication>, WorkflowError> {
        Ok(state.experts.list(filter).await?)
    }

    #[instrument(skip(state))]
    pub async fn list_approved(
        state: &AppState,
        price: PriceRange,
    ) -> Result<Vec<ExpertApplication>, WorkflowError> {
        Ok(state.experts.list(ExpertFilter::approved(price)).await?)
    }

    /// Best-effort: failures are logged and counted, never returned.
    async fn notify_applicant(state: &AppState, user_id: UserId, notification: Notification) {
        let recipient = match state.users.find_principal(user_id).await {
            Ok(principal) => principal.email,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Could not load applicant for notification");
                metrics::track_notification_failed(notification.kind());
                return;
            }
        };

        if let Err(e) = state.notifier.notify(&[recipient], &notification).await {
            warn!(user_id = %user_id, notification = %notification, error = %e, "Notification failed");
            metrics::track_notification_failed(notification.kind());
        }
    }
}

//! Status transitions and the approve-then-grant saga.
//!
//! [`decide`] reads the current status, checks the transition, then writes it
//! with a compare-and-set. Two concurrent decisions on one application both
//! read `Pending`, but only the first write matches; the second caller gets
//! [`WorkflowError::Conflict`].

use std::fmt;

use mindflow_core::WorkflowError;
use mindflow_db::StoreError;
use mindflow_models::{ApplicationStatus, Decision, UserId};
use tracing::{error, info, instrument, warn};

use crate::metrics;
use crate::store::{ApplicationStatusStore, UserRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationKind {
    Expert,
    Consultation,
}

impl ApplicationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expert => "expert",
            Self::Consultation => "consultation",
        }
    }

    pub fn not_found(self) -> WorkflowError {
        match self {
            Self::Expert => WorkflowError::not_found("Expert application not found"),
            Self::Consultation => WorkflowError::not_found("Consultation not found"),
        }
    }
}

/// Moves a `Pending` application to the decision's target status.
///
/// # Errors
///
/// - [`WorkflowError::NotFound`] if the application does not exist
/// - [`WorkflowError::Conflict`] if it is already terminal, including when a
///   concurrent decision landed between the read and the write
/// - [`WorkflowError::Persistence`] on storage failure
#[instrument(skip(store))]
pub async fn decide<S, Id>(
    store: &S,
    kind: ApplicationKind,
    id: Id,
    decision: Decision,
) -> Result<ApplicationStatus, WorkflowError>
where
    S: ApplicationStatusStore<Id> + ?Sized,
    Id: Copy + fmt::Debug + Send + Sync + 'static,
{
    let current = store.status_of(id).await.map_err(|e| match e {
        StoreError::NotFound => kind.not_found(),
        other => other.into(),
    })?;

    let target = current.apply(decision).inspect_err(|_| {
        metrics::track_decision_conflict(kind.as_str());
    })?;

    if store.transition_status(id, current, target).await? {
        info!(status = %target, "Application decided");
        metrics::track_application_decided(kind.as_str(), target.as_str());
        return Ok(target);
    }

    metrics::track_decision_conflict(kind.as_str());
    let winner = store.status_of(id).await.map_err(|e| match e {
        StoreError::NotFound => kind.not_found(),
        other => other.into(),
    })?;
    warn!(status = %winner, "Lost concurrent decision");
    Err(WorkflowError::conflict(format!(
        "Application already {}",
        winner
    )))
}

/// Adds `role` to the user's roles unless already present.
///
/// Returns whether the stored roles changed.
#[instrument(skip(users))]
pub async fn grant_role(
    users: &dyn UserRepository,
    user_id: UserId,
    role: &str,
) -> Result<bool, StoreError> {
    let mut principal = users.find_principal(user_id).await?;
    if !principal.grant_role(role) {
        return Ok(false);
    }
    users.update_roles(user_id, &principal.roles).await?;
    Ok(true)
}

/// Approves an application and grants its applicant `role`.
///
/// The approval and the grant are separate writes. A failed grant is retried
/// once; if that fails too the application stays `Approved`, the
/// inconsistency is logged with both ids, and `Persistence` is returned.
#[instrument(skip(applications, users))]
pub async fn approve_and_grant_role<S>(
    applications: &S,
    users: &dyn UserRepository,
    kind: ApplicationKind,
    application_id: UserId,
    applicant_id: UserId,
    role: &str,
) -> Result<(), WorkflowError>
where
    S: ApplicationStatusStore<UserId> + ?Sized,
{
    decide(applications, kind, application_id, Decision::Approve).await?;

    let first = match grant_role(users, applicant_id, role).await {
        Ok(_) => return Ok(()),
        Err(e) => e,
    };
    warn!(error = %first, "Role grant failed after approval, retrying once");

    match grant_role(users, applicant_id, role).await {
        Ok(_) => {
            metrics::track_role_grant_retry(true);
            Ok(())
        }
        Err(second) => {
            metrics::track_role_grant_retry(false);
            error!(
                application_id = %application_id,
                user_id = %applicant_id,
                role,
                error = %second,
                "Application approved but role grant failed; roles need manual repair"
            );
            Err(WorkflowError::persistence(second))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::store::{ExpertRepository, InMemoryStore};
    use mindflow_core::permissions::roles;
    use mindflow_models::NewExpertApplication;

    async fn store_with_application() -> (InMemoryStore, UserId) {
        let store = InMemoryStore::new();
        let user = store.add_user("applicant@example.com", &[]);
        ExpertRepository::insert(
            &store,
            NewExpertApplication {
                user_id: user,
                help_description: "Async Rust".to_string(),
                price: 100,
            },
        )
        .await
        .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_decide_moves_pending_to_target() {
        let (store, user) = store_with_application().await;

        let status = decide(&store, ApplicationKind::Expert, user, Decision::Reject)
            .await
            .unwrap();

        assert_eq!(status, ApplicationStatus::Rejected);
    }

    #[tokio::test]
    async fn test_second_decision_conflicts() {
        let (store, user) = store_with_application().await;

        decide(&store, ApplicationKind::Expert, user, Decision::Approve)
            .await
            .unwrap();
        let err = decide(&store, ApplicationKind::Expert, user, Decision::Reject)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Conflict(_)));
        let status = ApplicationStatusStore::<UserId>::status_of(&store, user)
            .await
            .unwrap();
        assert_eq!(status, ApplicationStatus::Approved);
    }

    #[tokio::test]
    async fn test_decide_missing_application_is_not_found() {
        let store = InMemoryStore::new();
        let err = decide(&store, ApplicationKind::Expert, UserId::new(), Decision::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_decisions_one_wins() {
        let (store, user) = store_with_application().await;

        let (a, b) = tokio::join!(
            decide(&store, ApplicationKind::Expert, user, Decision::Approve),
            decide(&store, ApplicationKind::Expert, user, Decision::Reject),
        );

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(WorkflowError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_grant_role_is_idempotent() {
        let (store, user) = store_with_application().await;

        assert!(grant_role(&store, user, roles::EXPERT).await.unwrap());
        assert!(!grant_role(&store, user, roles::EXPERT).await.unwrap());
        assert_eq!(store.roles_of(user).unwrap(), vec!["expert".to_string()]);
    }

    #[tokio::test]
    async fn test_grant_retried_once_after_failure() {
        let (store, user) = store_with_application().await;
        store.faults.fail_role_updates.store(1, Ordering::SeqCst);

        approve_and_grant_role(
            &store,
            &store,
            ApplicationKind::Expert,
            user,
            user,
            roles::EXPERT,
        )
        .await
        .unwrap();

        assert_eq!(store.roles_of(user).unwrap(), vec!["expert".to_string()]);
    }

    #[tokio::test]
    async fn test_grant_failing_twice_leaves_application_approved() {
        let (store, user) = store_with_application().await;
        store.faults.fail_role_updates.store(2, Ordering::SeqCst);

        let err = approve_and_grant_role(
            &store,
            &store,
            ApplicationKind::Expert,
            user,
            user,
            roles::EXPERT,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WorkflowError::Persistence(_)));
        let status = ApplicationStatusStore::<UserId>::status_of(&store, user)
            .await
            .unwrap();
        assert_eq!(status, ApplicationStatus::Approved);
        assert!(store.roles_of(user).unwrap().is_empty());
    }
}

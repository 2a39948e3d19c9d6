//! Persistence ports used by the workflow services.
//!
//! Services depend on these traits only; [`postgres::PgStore`] is the
//! production adapter and [`memory::InMemoryStore`] backs the tests.
//!
//! Status changes go through [`ApplicationStatusStore::transition_status`],
//! a compare-and-set that only writes when the stored status still equals the
//! one the caller read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mindflow_db::StoreError;
use mindflow_models::{
    ApplicationStatus, Consultation, ConsultationId, ExpertApplication, ExpertFilter, Meeting,
    NewConsultation, NewExpertApplication, Participant, Principal, StaffGrant, StatusFilter, User,
    UserId,
};

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Status access shared by every application kind.
#[async_trait]
pub trait ApplicationStatusStore<Id>: Send + Sync
where
    Id: Send + Sync + 'static,
{
    /// Current status, or [`StoreError::NotFound`].
    async fn status_of(&self, id: Id) -> Result<ApplicationStatus, StoreError>;

    /// Writes `to` only if the stored status is still `from`.
    ///
    /// Returns `false` when the guard did not match (including a missing row).
    async fn transition_status(
        &self,
        id: Id,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ExpertRepository: ApplicationStatusStore<UserId> {
    /// Fails with [`StoreError::UniqueViolation`] if the user already applied.
    async fn insert(&self, new: NewExpertApplication) -> Result<ExpertApplication, StoreError>;

    async fn get(&self, user_id: UserId) -> Result<ExpertApplication, StoreError>;

    async fn list(&self, filter: ExpertFilter) -> Result<Vec<ExpertApplication>, StoreError>;
}

#[async_trait]
pub trait ConsultationRepository: ApplicationStatusStore<ConsultationId> {
    async fn insert(&self, new: NewConsultation) -> Result<Consultation, StoreError>;

    async fn get(&self, id: ConsultationId) -> Result<Consultation, StoreError>;

    async fn list_by_status(&self, filter: StatusFilter) -> Result<Vec<Consultation>, StoreError>;

    async fn list_by_participant(
        &self,
        user_id: UserId,
        side: Participant,
    ) -> Result<Vec<Consultation>, StoreError>;

    async fn exists_for(&self, mentee_id: UserId, expert_id: UserId) -> Result<bool, StoreError>;

    /// Fails with [`StoreError::ForeignKeyViolation`] if the consultation does not exist.
    async fn insert_meeting(
        &self,
        consultation_id: ConsultationId,
        start_time: DateTime<Utc>,
        link: &str,
    ) -> Result<Meeting, StoreError>;

    async fn list_meetings(&self, consultation_id: ConsultationId)
    -> Result<Vec<Meeting>, StoreError>;

    /// Meetings of every consultation where `user_id` is on the given side.
    async fn list_meetings_for(
        &self,
        user_id: UserId,
        side: Participant,
    ) -> Result<Vec<Meeting>, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`StoreError::UniqueViolation`] on a duplicate email.
    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_principal(&self, user_id: UserId) -> Result<Principal, StoreError>;

    /// Every user, oldest account first.
    async fn list_users(&self) -> Result<Vec<Principal>, StoreError>;

    async fn update_roles(&self, user_id: UserId, roles: &[String]) -> Result<(), StoreError>;

    /// [`StoreError::NotFound`] when the user holds no staff grant.
    async fn find_staff_grant(&self, user_id: UserId) -> Result<StaffGrant, StoreError>;
}

//! PostgreSQL adapter for the persistence ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mindflow_db::{PgPool, StoreError};
use mindflow_models::{
    ApplicationStatus, Consultation, ConsultationId, ExpertApplication, ExpertFilter, Meeting,
    NewConsultation, NewExpertApplication, Participant, Principal, StaffGrant, StatusFilter, User,
    UserId,
};
use tracing::instrument;

use super::{ApplicationStatusStore, ConsultationRepository, ExpertRepository, UserRepository};

const EXPERT_COLUMNS: &str = "user_id, help_description, price, status, submitted_at";
const CONSULTATION_COLUMNS: &str =
    "id, expert_id, mentee_id, mentee_questions, status, submitted_at";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStatusStore<UserId> for PgStore {
    #[instrument(skip(self))]
    async fn status_of(&self, id: UserId) -> Result<ApplicationStatus, StoreError> {
        let status = sqlx::query_scalar::<_, ApplicationStatus>(
            "SELECT status FROM expert_applications WHERE user_id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(status)
    }

    #[instrument(skip(self))]
    async fn transition_status(
        &self,
        id: UserId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE expert_applications SET status = $3 WHERE user_id = $1 AND status = $2",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl ExpertRepository for PgStore {
    #[instrument(skip(self, new), fields(user_id = %new.user_id))]
    async fn insert(&self, new: NewExpertApplication) -> Result<ExpertApplication, StoreError> {
        let query = format!(
            "INSERT INTO expert_applications (user_id, help_description, price, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {EXPERT_COLUMNS}"
        );

        let application = sqlx::query_as::<_, ExpertApplication>(&query)
            .bind(new.user_id)
            .bind(&new.help_description)
            .bind(new.price)
            .bind(ApplicationStatus::Pending)
            .fetch_one(&self.pool)
            .await?;

        Ok(application)
    }

    #[instrument(skip(self))]
    async fn get(&self, user_id: UserId) -> Result<ExpertApplication, StoreError> {
        let query = format!("SELECT {EXPERT_COLUMNS} FROM expert_applications WHERE user_id = $1");

        let application = sqlx::query_as::<_, ExpertApplication>(&query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(application)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: ExpertFilter) -> Result<Vec<ExpertApplication>, StoreError> {
        let query = format!(
            "SELECT {EXPERT_COLUMNS} FROM expert_applications
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::INT IS NULL OR price >= $2)
               AND ($3::INT IS NULL OR price <= $3)
             ORDER BY submitted_at DESC"
        );

        let applications = sqlx::query_as::<_, ExpertApplication>(&query)
            .bind(filter.status.as_status())
            .bind(filter.price.min)
            .bind(filter.price.max)
            .fetch_all(&self.pool)
            .await?;

        Ok(applications)
    }
}

#[async_trait]
impl ApplicationStatusStore<ConsultationId> for PgStore {
    #[instrument(skip(self))]
    async fn status_of(&self, id: ConsultationId) -> Result<ApplicationStatus, StoreError> {
        let status = sqlx::query_scalar::<_, ApplicationStatus>(
            "SELECT status FROM consultations WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(status)
    }

    #[instrument(skip(self))]
    async fn transition_status(
        &self,
        id: ConsultationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE consultations SET status = $3 WHERE id = $1 AND status = $2")
                .bind(id)
                .bind(from)
                .bind(to)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl ConsultationRepository for PgStore {
    #[instrument(skip(self, new), fields(mentee_id = %new.mentee_id, expert_id = %new.expert_id))]
    async fn insert(&self, new: NewConsultation) -> Result<Consultation, StoreError> {
        let query = format!(
            "INSERT INTO consultations (expert_id, mentee_id, mentee_questions, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {CONSULTATION_COLUMNS}"
        );

        let consultation = sqlx::query_as::<_, Consultation>(&query)
            .bind(new.expert_id)
            .bind(new.mentee_id)
            .bind(&new.mentee_questions)
            .bind(ApplicationStatus::Pending)
            .fetch_one(&self.pool)
            .await?;

        Ok(consultation)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: ConsultationId) -> Result<Consultation, StoreError> {
        let query = format!("SELECT {CONSULTATION_COLUMNS} FROM consultations WHERE id = $1");

        let consultation = sqlx::query_as::<_, Consultation>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(consultation)
    }

    #[instrument(skip(self))]
    async fn list_by_status(&self, filter: StatusFilter) -> Result<Vec<Consultation>, StoreError> {
        let query = format!(
            "SELECT {CONSULTATION_COLUMNS} FROM consultations
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY submitted_at DESC"
        );

        let consultations = sqlx::query_as::<_, Consultation>(&query)
            .bind(filter.as_status())
            .fetch_all(&self.pool)
            .await?;

        Ok(consultations)
    }

    #[instrument(skip(self))]
    async fn list_by_participant(
        &self,
        user_id: UserId,
        side: Participant,
    ) -> Result<Vec<Consultation>, StoreError> {
        let column = participant_column(side);
        let query = format!(
            "SELECT {CONSULTATION_COLUMNS} FROM consultations
             WHERE {column} = $1
             ORDER BY submitted_at DESC"
        );

        let consultations = sqlx::query_as::<_, Consultation>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(consultations)
    }

    #[instrument(skip(self))]
    async fn exists_for(&self, mentee_id: UserId, expert_id: UserId) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM consultations WHERE mentee_id = $1 AND expert_id = $2)",
        )
        .bind(mentee_id)
        .bind(expert_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[instrument(skip(self, link))]
    async fn insert_meeting(
        &self,
        consultation_id: ConsultationId,
        start_time: DateTime<Utc>,
        link: &str,
    ) -> Result<Meeting, StoreError> {
        let meeting = sqlx::query_as::<_, Meeting>(
            "INSERT INTO consultation_meetings (consultation_id, start_time, link)
             VALUES ($1, $2, $3)
             RETURNING id, consultation_id, start_time, link",
        )
        .bind(consultation_id)
        .bind(start_time)
        .bind(link)
        .fetch_one(&self.pool)
        .await?;

        Ok(meeting)
    }

    #[instrument(skip(self))]
    async fn list_meetings(
        &self,
        consultation_id: ConsultationId,
    ) -> Result<Vec<Meeting>, StoreError> {
        let meetings = sqlx::query_as::<_, Meeting>(
            "SELECT id, consultation_id, start_time, link
             FROM consultation_meetings
             WHERE consultation_id = $1
             ORDER BY start_time",
        )
        .bind(consultation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(meetings)
    }

    #[instrument(skip(self))]
    async fn list_meetings_for(
        &self,
        user_id: UserId,
        side: Participant,
    ) -> Result<Vec<Meeting>, StoreError> {
        let column = participant_column(side);
        let query = format!(
            "SELECT m.id, m.consultation_id, m.start_time, m.link
             FROM consultation_meetings m
             JOIN consultations c ON c.id = m.consultation_id
             WHERE c.{column} = $1
             ORDER BY m.start_time"
        );

        let meetings = sqlx::query_as::<_, Meeting>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(meetings)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    #[instrument(skip(self, password_hash))]
    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash)
             VALUES ($1, $2)
             RETURNING id, email, password_hash, roles, created_at",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, roles, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_principal(&self, user_id: UserId) -> Result<Principal, StoreError> {
        let principal = sqlx::query_as::<_, Principal>(
            "SELECT id AS user_id, email, roles FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(principal)
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<Principal>, StoreError> {
        let users = sqlx::query_as::<_, Principal>(
            "SELECT id AS user_id, email, roles FROM users ORDER BY created_at, email",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    #[instrument(skip(self))]
    async fn update_roles(&self, user_id: UserId, roles: &[String]) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET roles = $2 WHERE id = $1")
            .bind(user_id)
            .bind(roles)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_staff_grant(&self, user_id: UserId) -> Result<StaffGrant, StoreError> {
        let grant = sqlx::query_as::<_, StaffGrant>(
            "SELECT user_id, permissions FROM staff_members WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(grant)
    }
}

fn participant_column(side: Participant) -> &'static str {
    match side {
        Participant::Expert => "expert_id",
        Participant::Mentee => "mentee_id",
    }
}

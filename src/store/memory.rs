//! In-memory adapter for tests.
//!
//! Mirrors the PostgreSQL schema's constraints (unique emails, one expert
//! application per user, foreign keys on consultations and meetings) and lets
//! tests inject storage failures through [`Faults`].

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mindflow_db::StoreError;
use mindflow_models::{
    ApplicationStatus, Consultation, ConsultationId, ExpertApplication, ExpertFilter, Meeting,
    MeetingId, NewConsultation, NewExpertApplication, Participant, Principal, StaffGrant,
    StatusFilter, User, UserId,
};

use super::{ApplicationStatusStore, ConsultationRepository, ExpertRepository, UserRepository};

/// Failure injection switches. Counters fail that many upcoming calls.
#[derive(Debug, Default)]
pub struct Faults {
    pub fail_role_updates: AtomicUsize,
    pub fail_transitions: AtomicUsize,
    pub fail_staff_lookups: AtomicBool,
}

impl Faults {
    fn take(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    staff: HashMap<UserId, StaffGrant>,
    experts: Vec<ExpertApplication>,
    consultations: Vec<Consultation>,
    meetings: Vec<Meeting>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    pub faults: Faults,
}

fn backend_failure() -> StoreError {
    StoreError::Backend(sqlx::Error::PoolTimedOut)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tables<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self
            .tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut tables)
    }

    /// Seeds a user directly, bypassing registration.
    pub fn add_user(&self, email: &str, roles: &[&str]) -> UserId {
        let user = User {
            id: UserId::new(),
            email: email.to_string(),
            password_hash: String::new(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            created_at: Utc::now(),
        };
        let id = user.id;
        self.with_tables(|t| t.users.push(user));
        id
    }

    pub fn grant_staff(&self, user_id: UserId, permissions: &[&str]) {
        let grant = StaffGrant {
            user_id,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        };
        self.with_tables(|t| {
            t.staff.insert(user_id, grant);
        });
    }

    pub fn roles_of(&self, user_id: UserId) -> Option<Vec<String>> {
        self.with_tables(|t| {
            t.users
                .iter()
                .find(|u| u.id == user_id)
                .map(|u| u.roles.clone())
        })
    }

    pub fn meeting_count(&self) -> usize {
        self.with_tables(|t| t.meetings.len())
    }
}

fn transition<T>(
    rows: &mut [T],
    matches: impl Fn(&T) -> bool,
    status: impl Fn(&mut T) -> &mut ApplicationStatus,
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> bool {
    let Some(row) = rows.iter_mut().find(|row| matches(&**row)) else {
        return false;
    };
    let current = status(row);
    if *current != from {
        return false;
    }
    *current = to;
    true
}

#[async_trait]
impl ApplicationStatusStore<UserId> for InMemoryStore {
    async fn status_of(&self, id: UserId) -> Result<ApplicationStatus, StoreError> {
        let status = self.with_tables(|t| {
            t.experts
                .iter()
                .find(|a| a.user_id == id)
                .map(|a| a.status)
                .ok_or(StoreError::NotFound)
        });
        // Let a concurrent decision read the same status before either writes.
        tokio::task::yield_now().await;
        status
    }

    async fn transition_status(
        &self,
        id: UserId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<bool, StoreError> {
        if Faults::take(&self.faults.fail_transitions) {
            return Err(backend_failure());
        }
        Ok(self.with_tables(|t| {
            transition(&mut t.experts, |a| a.user_id == id, |a| &mut a.status, from, to)
        }))
    }
}

#[async_trait]
impl ExpertRepository for InMemoryStore {
    async fn insert(&self, new: NewExpertApplication) -> Result<ExpertApplication, StoreError> {
        self.with_tables(|t| {
            if !t.users.iter().any(|u| u.id == new.user_id) {
                return Err(StoreError::ForeignKeyViolation);
            }
            if t.experts.iter().any(|a| a.user_id == new.user_id) {
                return Err(StoreError::UniqueViolation);
            }
            let application = ExpertApplication {
                user_id: new.user_id,
                help_description: new.help_description,
                price: new.price,
                status: ApplicationStatus::Pending,
                submitted_at: Utc::now(),
            };
            t.experts.push(application.clone());
            Ok(application)
        })
    }

    async fn get(&self, user_id: UserId) -> Result<ExpertApplication, StoreError> {
        self.with_tables(|t| {
            t.experts
                .iter()
                .find(|a| a.user_id == user_id)
                .cloned()
                .ok_or(StoreError::NotFound)
        })
    }

    async fn list(&self, filter: ExpertFilter) -> Result<Vec<ExpertApplication>, StoreError> {
        Ok(self.with_tables(|t| {
            t.experts
                .iter()
                .rev()
                .filter(|a| filter.matches(a))
                .cloned()
                .collect()
        }))
    }
}

#[async_trait]
impl ApplicationStatusStore<ConsultationId> for InMemoryStore {
    async fn status_of(&self, id: ConsultationId) -> Result<ApplicationStatus, StoreError> {
        let status = self.with_tables(|t| {
            t.consultations
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.status)
                .ok_or(StoreError::NotFound)
        });
        tokio::task::yield_now().await;
        status
    }

    async fn transition_status(
        &self,
        id: ConsultationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<bool, StoreError> {
        if Faults::take(&self.faults.fail_transitions) {
            return Err(backend_failure());
        }
        Ok(self.with_tables(|t| {
            transition(&mut t.consultations, |c| c.id == id, |c| &mut c.status, from, to)
        }))
    }
}

#[async_trait]
impl ConsultationRepository for InMemoryStore {
    async fn insert(&self, new: NewConsultation) -> Result<Consultation, StoreError> {
        self.with_tables(|t| {
            let known = |id: UserId| t.users.iter().any(|u| u.id == id);
            if !known(new.expert_id) || !known(new.mentee_id) {
                return Err(StoreError::ForeignKeyViolation);
            }
            let consultation = Consultation {
                id: ConsultationId::new(),
                expert_id: new.expert_id,
                mentee_id: new.mentee_id,
                mentee_questions: new.mentee_questions,
                status: ApplicationStatus::Pending,
                submitted_at: Utc::now(),
            };
            t.consultations.push(consultation.clone());
            Ok(consultation)
        })
    }

    async fn get(&self, id: ConsultationId) -> Result<Consultation, StoreError> {
        self.with_tables(|t| {
            t.consultations
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or(StoreError::NotFound)
        })
    }

    async fn list_by_status(&self, filter: StatusFilter) -> Result<Vec<Consultation>, StoreError> {
        Ok(self.with_tables(|t| {
            t.consultations
                .iter()
                .rev()
                .filter(|c| filter.matches(c.status))
                .cloned()
                .collect()
        }))
    }

    async fn list_by_participant(
        &self,
        user_id: UserId,
        side: Participant,
    ) -> Result<Vec<Consultation>, StoreError> {
        Ok(self.with_tables(|t| {
            t.consultations
                .iter()
                .rev()
                .filter(|c| on_side(c, user_id, side))
                .cloned()
                .collect()
        }))
    }

    async fn exists_for(&self, mentee_id: UserId, expert_id: UserId) -> Result<bool, StoreError> {
        Ok(self.with_tables(|t| {
            t.consultations
                .iter()
                .any(|c| c.mentee_id == mentee_id && c.expert_id == expert_id)
        }))
    }

    async fn insert_meeting(
        &self,
        consultation_id: ConsultationId,
        start_time: DateTime<Utc>,
        link: &str,
    ) -> Result<Meeting, StoreError> {
        self.with_tables(|t| {
            if !t.consultations.iter().any(|c| c.id == consultation_id) {
                return Err(StoreError::ForeignKeyViolation);
            }
            let meeting = Meeting {
                id: MeetingId::new(),
                consultation_id,
                start_time,
                link: link.to_string(),
            };
            t.meetings.push(meeting.clone());
            Ok(meeting)
        })
    }

    async fn list_meetings(
        &self,
        consultation_id: ConsultationId,
    ) -> Result<Vec<Meeting>, StoreError> {
        Ok(self.with_tables(|t| {
            let mut meetings: Vec<Meeting> = t
                .meetings
                .iter()
                .filter(|m| m.consultation_id == consultation_id)
                .cloned()
                .collect();
            meetings.sort_by_key(|m| m.start_time);
            meetings
        }))
    }

    async fn list_meetings_for(
        &self,
        user_id: UserId,
        side: Participant,
    ) -> Result<Vec<Meeting>, StoreError> {
        Ok(self.with_tables(|t| {
            let mut meetings: Vec<Meeting> = t
                .meetings
                .iter()
                .filter(|m| {
                    t.consultations
                        .iter()
                        .any(|c| c.id == m.consultation_id && on_side(c, user_id, side))
                })
                .cloned()
                .collect();
            meetings.sort_by_key(|m| m.start_time);
            meetings
        }))
    }
}

fn on_side(consultation: &Consultation, user_id: UserId, side: Participant) -> bool {
    match side {
        Participant::Expert => consultation.expert_id == user_id,
        Participant::Mentee => consultation.mentee_id == user_id,
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        self.with_tables(|t| {
            if t.users.iter().any(|u| u.email == email) {
                return Err(StoreError::UniqueViolation);
            }
            let user = User {
                id: UserId::new(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                roles: Vec::new(),
                created_at: Utc::now(),
            };
            t.users.push(user.clone());
            Ok(user)
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.with_tables(|t| t.users.iter().find(|u| u.email == email).cloned()))
    }

    async fn find_principal(&self, user_id: UserId) -> Result<Principal, StoreError> {
        self.with_tables(|t| {
            t.users
                .iter()
                .find(|u| u.id == user_id)
                .map(Principal::from)
                .ok_or(StoreError::NotFound)
        })
    }

    async fn list_users(&self) -> Result<Vec<Principal>, StoreError> {
        Ok(self.with_tables(|t| t.users.iter().map(Principal::from).collect()))
    }

    async fn update_roles(&self, user_id: UserId, roles: &[String]) -> Result<(), StoreError> {
        if Faults::take(&self.faults.fail_role_updates) {
            return Err(backend_failure());
        }
        self.with_tables(|t| {
            let user = t
                .users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or(StoreError::NotFound)?;
            user.roles = roles.to_vec();
            Ok(())
        })
    }

    async fn find_staff_grant(&self, user_id: UserId) -> Result<StaffGrant, StoreError> {
        if self.faults.fail_staff_lookups.load(Ordering::SeqCst) {
            return Err(backend_failure());
        }
        self.with_tables(|t| t.staff.get(&user_id).cloned().ok_or(StoreError::NotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transition_is_guarded_by_expected_status() {
        let store = InMemoryStore::new();
        let user = store.add_user("a@example.com", &[]);
        ExpertRepository::insert(
            &store,
            NewExpertApplication {
                user_id: user,
                help_description: "help".to_string(),
                price: 10,
            },
        )
        .await
        .unwrap();

        let first = ApplicationStatusStore::<UserId>::transition_status(
            &store,
            user,
            ApplicationStatus::Pending,
            ApplicationStatus::Approved,
        )
        .await
        .unwrap();
        let second = ApplicationStatusStore::<UserId>::transition_status(
            &store,
            user,
            ApplicationStatus::Pending,
            ApplicationStatus::Rejected,
        )
        .await
        .unwrap();

        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn test_meeting_requires_existing_consultation() {
        let store = InMemoryStore::new();
        let result = store
            .insert_meeting(ConsultationId::new(), Utc::now(), "https://meet")
            .await;
        assert!(matches!(result, Err(StoreError::ForeignKeyViolation)));
    }

    #[tokio::test]
    async fn test_fault_counter_fails_exactly_n_calls() {
        let store = InMemoryStore::new();
        let user = store.add_user("b@example.com", &[]);
        store.faults.fail_role_updates.store(1, Ordering::SeqCst);

        assert!(store.update_roles(user, &[]).await.is_err());
        assert!(store.update_roles(user, &[]).await.is_ok());
    }
}

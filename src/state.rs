use std::sync::Arc;

use mindflow_config::{AppConfig, CorsConfig, JwtConfig};
use mindflow_db::PgPool;

use crate::store::{ConsultationRepository, ExpertRepository, PgStore, UserRepository};
use crate::utils::email::EmailNotifier;
use crate::utils::notifier::Notifier;

/// Shared, cheaply cloneable request state.
///
/// Collaborators sit behind trait objects so the same router runs against
/// PostgreSQL in production and in-memory doubles in tests.
#[derive(Clone)]
pub struct AppState {
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub experts: Arc<dyn ExpertRepository>,
    pub consultations: Arc<dyn ConsultationRepository>,
    pub users: Arc<dyn UserRepository>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(config: &AppConfig, pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));

        Self {
            jwt_config: config.jwt.clone(),
            cors_config: config.cors.clone(),
            experts: store.clone(),
            consultations: store.clone(),
            users: store,
            notifier: Arc::new(EmailNotifier::new(config.email.clone())),
        }
    }
}

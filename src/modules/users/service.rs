use mindflow_core::WorkflowError;
use mindflow_db::StoreError;
use mindflow_models::{Principal, UserId};
use tracing::instrument;

use crate::state::AppState;

pub struct UserService;

impl UserService {
    #[instrument(skip(state))]
    pub async fn list(state: &AppState) -> Result<Vec<Principal>, WorkflowError> {
        Ok(state.users.list_users().await?)
    }

    #[instrument(skip(state))]
    pub async fn get(state: &AppState, user_id: UserId) -> Result<Principal, WorkflowError> {
        state.users.find_principal(user_id).await.map_err(|e| match e {
            StoreError::NotFound => WorkflowError::not_found("User not found"),
            other => other.into(),
        })
    }
}

use anyhow::anyhow;
use mindflow_auth::create_access_token;
use mindflow_config::JwtConfig;
use mindflow_core::{AppError, WorkflowError, hash_password, verify_password};
use mindflow_db::StoreError;
use mindflow_models::{LoginRequest, LoginResponse, Principal, RegisterRequest};
use tracing::{info, instrument};

use crate::metrics;
use crate::store::UserRepository;

pub struct AuthService;

impl AuthService {
    #[instrument(skip(users, dto), fields(email = %dto.email))]
    pub async fn register_user(
        users: &dyn UserRepository,
        dto: RegisterRequest,
    ) -> Result<Principal, AppError> {
        let hashed_password = hash_password(&dto.password)?;

        let user = users
            .insert_user(&dto.email, &hashed_password)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation => {
                    AppError::conflict(anyhow!("Email already registered"))
                }
                other => WorkflowError::from(other).into(),
            })?;

        info!(user_id = %user.id, "User registered");
        metrics::track_user_registered();
        Ok(Principal::from(&user))
    }

    /// Wrong email and wrong password are indistinguishable to the caller.
    #[instrument(skip(users, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        users: &dyn UserRepository,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let invalid = || AppError::unauthorized("Invalid email or password".to_string());

        let user = users
            .find_by_email(&dto.email)
            .await
            .map_err(WorkflowError::from)?
            .ok_or_else(|| {
                metrics::track_login(false);
                invalid()
            })?;

        if !verify_password(&dto.password, &user.password_hash)? {
            metrics::track_login(false);
            return Err(invalid());
        }

        let access_token =
            create_access_token(user.id.into_inner(), &user.email, user.roles.clone(), jwt_config)?;

        metrics::track_login(true);
        Ok(LoginResponse::bearer(access_token, Principal::from(&user)))
    }
}

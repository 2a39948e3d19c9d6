//! JWT utilities for access tokens.
//!
//! Tokens are HS256-signed with the configured secret. The issuer is the
//! login endpoint; every protected route verifies through [`verify_token`].

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use mindflow_config::JwtConfig;
use mindflow_core::{AppError, WorkflowError};

use crate::claims::Claims;

/// Creates an access token carrying the user's id, email, and role snapshot.
///
/// # Errors
///
/// Returns an internal error if encoding fails (e.g. an unusable secret).
///
/// # Example
///
/// ```ignore
/// let token = create_access_token(user_id, "expert@example.com", vec!["expert".into()], &jwt_config)?;
/// ```
pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    roles: Vec<String>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        roles,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry and returns the embedded claims.
///
/// Any failure is reported as [`WorkflowError::Unauthenticated`]; the reason is
/// deliberately not surfaced to the caller.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, WorkflowError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| WorkflowError::Unauthenticated)
}

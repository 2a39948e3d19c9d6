use std::env;

/// Shortest accepted HS256 signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JwtConfigError {
    #[error("JWT_SECRET must be set")]
    MissingSecret,
    #[error("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes, got {0}")]
    SecretTooShort(usize),
}

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds
    pub access_token_expiry: i64,
}

impl JwtConfig {
    /// There is no default secret: a server without one refuses to start.
    pub fn new(secret: Option<String>, access_token_expiry: i64) -> Result<Self, JwtConfigError> {
        let secret = secret
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(JwtConfigError::MissingSecret)?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtConfigError::SecretTooShort(secret.len()));
        }

        Ok(Self {
            secret,
            access_token_expiry,
        })
    }

    pub fn from_env() -> Result<Self, JwtConfigError> {
        Self::new(
            env::var("JWT_SECRET").ok(),
            env::var("JWT_ACCESS_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600), // 1 hour
        )
    }
}

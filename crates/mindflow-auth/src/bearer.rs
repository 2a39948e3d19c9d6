//! `Authorization` header parsing.
//!
//! The accepted shape is exactly two whitespace-separated fields, the first
//! being the literal `Bearer`. Clients that serialize a missing token as the
//! strings `null` or `undefined` are treated as sending no token at all.

use mindflow_config::JwtConfig;
use mindflow_core::WorkflowError;

use crate::{claims::Claims, jwt::verify_token};

const SCHEME: &str = "Bearer";
const PLACEHOLDER_TOKENS: [&str; 2] = ["null", "undefined"];

/// Pulls the raw token out of an `Authorization` header value.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, WorkflowError> {
    let header = header.ok_or(WorkflowError::Unauthenticated)?;
    let mut fields = header.split_whitespace();

    match (fields.next(), fields.next(), fields.next()) {
        (Some(SCHEME), Some(token), None) if !PLACEHOLDER_TOKENS.contains(&token) => Ok(token),
        _ => Err(WorkflowError::Unauthenticated),
    }
}

/// Parses the header and verifies the token it carries.
pub fn resolve_bearer(header: Option<&str>, jwt_config: &JwtConfig) -> Result<Claims, WorkflowError> {
    let token = extract_bearer_token(header)?;
    verify_token(token, jwt_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::create_access_token;
    use uuid::Uuid;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "bearer-test-secret-at-least-32-characters".to_string(),
            access_token_expiry: 600,
        }
    }

    #[test]
    fn test_extract_valid_header() {
        assert_eq!(extract_bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_extract_rejects_malformed_headers() {
        let cases = [
            None,
            Some(""),
            Some("Bearer"),
            Some("Basic abc"),
            Some("bearer abc"),
            Some("Bearer abc extra"),
            Some("Bearer null"),
            Some("Bearer undefined"),
        ];

        for header in cases {
            assert!(
                matches!(extract_bearer_token(header), Err(WorkflowError::Unauthenticated)),
                "expected rejection for {:?}",
                header
            );
        }
    }

    #[test]
    fn test_resolve_bearer_round_trip() {
        let config = config();
        let user_id = Uuid::new_v4();
        let token = create_access_token(user_id, "m@example.com", vec![], &config).unwrap();
        let header = format!("Bearer {}", token);

        let claims = resolve_bearer(Some(&header), &config).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn test_resolve_bearer_rejects_tampered_token() {
        let config = config();
        let token = create_access_token(Uuid::new_v4(), "m@example.com", vec![], &config).unwrap();
        let header = format!("Bearer {}x", token);

        assert!(matches!(
            resolve_bearer(Some(&header), &config),
            Err(WorkflowError::Unauthenticated)
        ));
    }
}

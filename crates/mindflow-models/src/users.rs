//! User records, the per-request principal and staff grants.

use chrono::{DateTime, Utc};
use mindflow_auth::Claims;
use mindflow_core::WorkflowError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::UserId;

/// A registered user as stored. Never serialized directly into responses.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// The identity a request acts as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Adds `role` unless already held. Returns whether the set changed.
    pub fn grant_role(&mut self, role: &str) -> bool {
        if self.has_role(role) {
            return false;
        }
        self.roles.push(role.to_string());
        true
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            roles: user.roles.clone(),
        }
    }
}

impl TryFrom<Claims> for Principal {
    type Error = WorkflowError;

    /// A verified token whose subject is not a UUID is still an unusable credential.
    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| WorkflowError::Unauthenticated)?;

        Ok(Self {
            user_id,
            email: claims.email,
            roles: claims.roles,
        })
    }
}

/// Elevated permissions held by a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StaffGrant {
    pub user_id: UserId,
    pub permissions: Vec<String>,
}

impl StaffGrant {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .iter()
            .any(|p| p.eq_ignore_ascii_case(permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindflow_core::permissions;

    fn principal(roles: &[&str]) -> Principal {
        Principal {
            user_id: UserId::new(),
            email: "p@example.com".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_grant_role_is_idempotent() {
        let mut p = principal(&[]);
        assert!(p.grant_role(permissions::roles::EXPERT));
        assert!(!p.grant_role(permissions::roles::EXPERT));
        assert_eq!(p.roles, vec!["expert".to_string()]);
    }

    #[test]
    fn test_principal_from_claims() {
        let id = UserId::new();
        let claims = Claims {
            sub: id.to_string(),
            email: "c@example.com".to_string(),
            roles: vec!["expert".to_string()],
            exp: 0,
            iat: 0,
        };
        let p = Principal::try_from(claims).unwrap();
        assert_eq!(p.user_id, id);
        assert!(p.has_role("expert"));
    }

    #[test]
    fn test_principal_from_claims_rejects_bad_subject() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            email: "c@example.com".to_string(),
            roles: vec![],
            exp: 0,
            iat: 0,
        };
        assert!(matches!(
            Principal::try_from(claims),
            Err(WorkflowError::Unauthenticated)
        ));
    }

    #[test]
    fn test_staff_grant_permission_lookup() {
        let grant = StaffGrant {
            user_id: UserId::new(),
            permissions: vec!["Admin".to_string()],
        };
        assert!(grant.has_permission(permissions::ADMIN));
        assert!(!grant.has_permission("billing"));
    }
}

//! # Mindflow Auth
//!
//! Credential verification for the Mindflow API.
//!
//! - [`claims`]: the access token claim set
//! - [`jwt`]: token issuing and signature verification
//! - [`bearer`]: `Authorization` header parsing and the combined resolver
//!
//! Every way a credential can be wrong (absent, malformed header, bad
//! signature, expired) collapses into the same
//! [`WorkflowError::Unauthenticated`](mindflow_core::WorkflowError::Unauthenticated).
//!
//! # Example
//!
//! ```ignore
//! use mindflow_auth::{create_access_token, resolve_bearer};
//!
//! let token = create_access_token(user_id, "mentee@example.com", vec![], &config)?;
//! let header = format!("Bearer {}", token);
//! let claims = resolve_bearer(Some(&header), &config)?;
//! assert_eq!(claims.email, "mentee@example.com");
//! ```

pub mod bearer;
pub mod claims;
pub mod jwt;

pub use bearer::{extract_bearer_token, resolve_bearer};
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};

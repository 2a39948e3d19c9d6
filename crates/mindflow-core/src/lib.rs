//! # Mindflow Core
//!
//! Core types, errors, and utilities for the Mindflow API.
//!
//! - [`errors`]: the workflow error taxonomy and its HTTP response conversion
//! - [`password`]: password hashing and verification
//! - [`permissions`]: staff permission and role label constants
//!
//! # Example
//!
//! ```ignore
//! use mindflow_core::errors::{AppError, WorkflowError};
//!
//! let error: AppError = WorkflowError::Conflict("already decided".into()).into();
//! assert_eq!(error.status, axum::http::StatusCode::CONFLICT);
//! ```

pub mod errors;
pub mod password;
pub mod permissions;

pub use errors::{AppError, WorkflowError};
pub use password::{hash_password, verify_password};

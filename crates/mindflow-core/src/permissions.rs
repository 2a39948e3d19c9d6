//! Staff permission names and user role labels.
//!
//! Staff permissions live in the `staff_members` table and are consulted by the
//! elevated-permission gate. Role labels live on the user record and travel
//! inside access tokens.
//!
//! # Example
//!
//! ```ignore
//! use mindflow_core::permissions;
//!
//! if grant.has_permission(permissions::ADMIN) {
//!     // staff-only operation
//! }
//! ```

// =============================================================================
// Staff permissions
// =============================================================================

/// Full administrative access to applications and meetings
pub const ADMIN: &str = "admin";

// =============================================================================
// Role labels
// =============================================================================

pub mod roles {
    /// Granted when an expert application is approved
    pub const EXPERT: &str = "expert";
}

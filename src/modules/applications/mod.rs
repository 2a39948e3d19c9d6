//! The application lifecycle shared by expert and consultation workflows.

pub mod lifecycle;

pub use lifecycle::{ApplicationKind, approve_and_grant_role, decide, grant_role};

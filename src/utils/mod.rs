//! Shared utilities.
//!
//! - [`notifier`]: the notification port and its message catalogue
//! - [`email`]: SMTP-backed notifier using lettre

pub mod email;
pub mod notifier;

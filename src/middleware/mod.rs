//! Request middleware.
//!
//! - [`auth`]: the access-control gates and the [`auth::CurrentPrincipal`] extractor

pub mod auth;

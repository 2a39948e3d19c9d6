pub mod applications;
pub mod auth;
pub mod consultations;
pub mod experts;
pub mod users;

//! # Mindflow Models
//!
//! Domain models and DTOs for the Mindflow API.
//!
//! # Modules
//!
//! - [`ids`]: strongly-typed UUID newtypes
//! - [`applications`]: the shared application lifecycle and query filters
//! - [`experts`]: expert applications
//! - [`consultations`]: consultation applications and their meetings
//! - [`users`]: user records, the request principal and staff grants
//! - [`auth`]: registration and login DTOs

pub mod applications;
pub mod auth;
pub mod consultations;
pub mod experts;
pub mod ids;
pub mod users;

pub use applications::{ApplicationStatus, Decision, Participant, PriceRange, StatusFilter};
pub use auth::{Claims, LoginRequest, LoginResponse, RegisterRequest};
pub use consultations::{
    AlreadyAppliedResponse, ApplyForConsultationDto, Consultation, ConsultationFilterParams,
    Meeting, NewConsultation, ScheduleMeetingDto,
};
pub use experts::{
    ApplyForExpertDto, DecideExpertDto, ExpertApplication, ExpertFilter, ExpertFilterParams,
    NewExpertApplication, PriceFilterParams,
};
pub use ids::{ConsultationId, MeetingId, UserId};
pub use users::{Principal, StaffGrant, User};

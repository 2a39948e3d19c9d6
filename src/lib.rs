//! # Mindflow API
//!
//! Backend for a mentorship marketplace built with Rust, Axum, and PostgreSQL.
//! Users apply to become experts, staff vet those applications, mentees apply
//! for consultations with approved experts, and staff schedule meetings.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # Credential, principal, and staff-permission gates
//! ├── modules/          # Feature modules
//! │   ├── applications/ # Shared Pending -> Approved | Rejected lifecycle
//! │   ├── auth/         # Register, login, current principal
//! │   ├── experts/      # Expert applications and directory
//! │   └── consultations/# Consultations and meetings
//! ├── store/            # Repository ports, PostgreSQL and in-memory adapters
//! └── utils/            # Notifier port and SMTP adapter
//! ```
//!
//! Each feature module has the same layout:
//!
//! - `controller.rs`: HTTP handlers
//! - `service.rs`: workflow logic
//! - `router.rs`: Axum router with its access gates
//!
//! Models and DTOs live in the `mindflow-models` crate.
//!
//! ## Access control
//!
//! Every protected route passes through up to three gates, in order:
//!
//! 1. **Credential**: a `Bearer` token signed with the configured secret, else 401.
//! 2. **Principal**: the verified identity bound to the request, else 403.
//! 3. **Elevated permission**: a staff grant carrying `admin`, else 403.
//!
//! ## Application lifecycle
//!
//! Expert and consultation applications start `pending` and move exactly once
//! to `approved` or `rejected`. A second decision is a conflict. Approving an
//! expert also grants the `expert` role; scheduling a meeting approves the
//! consultation it belongs to.
//!
//! ## API Documentation
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`
//!
//! ## Modules
//!
//! - [`docs`]: OpenAPI documentation setup
//! - [`logging`]: request logging and tracing subscriber setup
//! - [`metrics`]: Prometheus metrics
//! - [`middleware`]: access-control gates and extractors
//! - [`modules`]: feature modules
//! - [`router`]: main application router
//! - [`state`]: shared application state
//! - [`store`]: persistence ports and adapters
//! - [`utils`]: notifications
//! - [`validator`]: request validation utilities

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod store;
pub mod utils;
pub mod validator;

// Re-export workspace crates for convenience
pub use mindflow_auth;
pub use mindflow_config;
pub use mindflow_core;
pub use mindflow_db;
pub use mindflow_models;

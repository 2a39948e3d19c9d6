//! The application lifecycle shared by expert and consultation applications.
//!
//! ```text
//! Pending ──approve──▶ Approved
//!    │
//!    └────reject────▶ Rejected
//! ```
//!
//! `Approved` and `Rejected` are terminal. Status is stored as lowercase text.

use std::{fmt, str::FromStr};

use mindflow_core::WorkflowError;
use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgTypeInfo, Postgres},
};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns the status a decision moves this application to.
    ///
    /// Terminal applications accept no further decisions.
    pub fn apply(self, decision: Decision) -> Result<ApplicationStatus, WorkflowError> {
        if self.is_terminal() {
            return Err(WorkflowError::conflict(format!(
                "Application already {}",
                self
            )));
        }
        Ok(decision.target())
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(WorkflowError::validation(format!(
                "Invalid status '{}': expected pending, approved or rejected",
                other
            ))),
        }
    }
}

impl Type<Postgres> for ApplicationStatus {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Postgres> for ApplicationStatus {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as Encode<'q, Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> Decode<'r, Postgres> for ApplicationStatus {
    fn decode(
        value: <Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as Decode<'r, Postgres>>::decode(value)?;
        raw.parse::<ApplicationStatus>()
            .map_err(|e| e.to_string().into())
    }
}

/// Outcome of an authorized status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub const fn target(self) -> ApplicationStatus {
        match self {
            Self::Approve => ApplicationStatus::Approved,
            Self::Reject => ApplicationStatus::Rejected,
        }
    }
}

/// Status predicate for listings. Absent or empty input selects every status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl StatusFilter {
    pub fn parse(raw: Option<&str>) -> Result<Self, WorkflowError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::All),
            Some(value) => value.parse().map(Self::Only),
        }
    }

    pub fn matches(self, status: ApplicationStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }

    /// The status to bind into a query, `None` meaning unrestricted.
    pub fn as_status(self) -> Option<ApplicationStatus> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(status),
        }
    }
}

/// Inclusive price bounds for expert listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl PriceRange {
    pub fn new(min: Option<i32>, max: Option<i32>) -> Result<Self, WorkflowError> {
        if min.is_some_and(|m| m < 0) || max.is_some_and(|m| m < 0) {
            return Err(WorkflowError::validation("Price bounds must not be negative"));
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(WorkflowError::validation(
                    "min_price must not exceed max_price",
                ));
            }
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, price: i32) -> bool {
        self.min.is_none_or(|lo| price >= lo) && self.max.is_none_or(|hi| price <= hi)
    }
}

/// Which side of a consultation a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    Expert,
    Mentee,
}

//! Expert application models and DTOs.

use chrono::{DateTime, Utc};
use mindflow_core::WorkflowError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::applications::{ApplicationStatus, PriceRange, StatusFilter};
use crate::ids::UserId;

/// A user's request to be listed as an expert. Keyed by the applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ExpertApplication {
    pub user_id: UserId,
    pub help_description: String,
    pub price: i32,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
}

/// Validated input for a new expert application.
#[derive(Debug, Clone)]
pub struct NewExpertApplication {
    pub user_id: UserId,
    pub help_description: String,
    pub price: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ApplyForExpertDto {
    #[validate(length(min = 1, max = 2000))]
    #[schema(example = "I can help with Rust ownership and async design")]
    pub help_description: String,
    #[validate(range(min = 0))]
    #[schema(example = 100)]
    pub price: i32,
}

/// Body of the approve/reject endpoints.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DecideExpertDto {
    pub expert_id: UserId,
}

#[derive(Debug, Default, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct PriceFilterParams {
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
}

impl PriceFilterParams {
    pub fn to_range(&self) -> Result<PriceRange, WorkflowError> {
        PriceRange::new(self.min_price, self.max_price)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ExpertFilterParams {
    /// `pending`, `approved` or `rejected`; empty or absent lists every status
    pub status: Option<String>,
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
}

/// Typed predicate for expert application listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpertFilter {
    pub status: StatusFilter,
    pub price: PriceRange,
}

impl ExpertFilter {
    pub fn approved(price: PriceRange) -> Self {
        Self {
            status: StatusFilter::Only(ApplicationStatus::Approved),
            price,
        }
    }

    pub fn matches(&self, application: &ExpertApplication) -> bool {
        self.status.matches(application.status) && self.price.contains(application.price)
    }
}

impl TryFrom<&ExpertFilterParams> for ExpertFilter {
    type Error = WorkflowError;

    fn try_from(params: &ExpertFilterParams) -> Result<Self, Self::Error> {
        Ok(Self {
            status: StatusFilter::parse(params.status.as_deref())?,
            price: PriceRange::new(params.min_price, params.max_price)?,
        })
    }
}

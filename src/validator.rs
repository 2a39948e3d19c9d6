//! Request body, query and path validation.
//!
//! [`ValidatedJson`] rejects unreadable bodies with 400 and bodies that fail
//! their `validator` rules with 422. [`QueryParams`] and [`parse_path_id`]
//! turn malformed query strings and path identifiers into a 400 with a JSON
//! error body instead of axum's plain-text rejection.

use std::str::FromStr;

use anyhow::anyhow;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Query, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::request::Parts,
};
use mindflow_core::{AppError, WorkflowError};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

fn describe_rejection(rejection: &JsonRejection) -> String {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return "Missing 'Content-Type: application/json' header".to_string();
    }

    let body = rejection.body_text();
    if let Some(field) = body
        .split("missing field `")
        .nth(1)
        .and_then(|rest| rest.split('`').next())
    {
        return format!("{} is required", field);
    }
    if body.contains("invalid type") || body.contains("invalid value") {
        return "Invalid field type in request".to_string();
    }
    "Invalid request body".to_string()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(anyhow!(describe_rejection(&rejection))))?;

        value
            .validate()
            .map_err(|errors| AppError::unprocessable(anyhow!(format_errors(&errors))))?;

        Ok(ValidatedJson(value))
    }
}

fn describe_query_rejection(rejection: &QueryRejection) -> String {
    let body = rejection.body_text();
    match body.strip_prefix("Failed to deserialize query string: ") {
        Some(detail) => format!("Invalid query parameters: {}", detail),
        None => "Invalid query parameters".to_string(),
    }
}

/// `Query<T>` with a JSON 400 on rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::bad_request(anyhow!(describe_query_rejection(&rejection)))
            })?;
        Ok(QueryParams(value))
    }
}

/// Parses an identifier taken from the request path.
pub fn parse_path_id<T>(raw: &str, what: &str) -> Result<T, WorkflowError>
where
    T: FromStr,
{
    raw.parse()
        .map_err(|_| WorkflowError::validation(format!("Invalid {} id", what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindflow_models::ConsultationId;

    #[test]
    fn test_parse_path_id() {
        let id = ConsultationId::new();
        let parsed: ConsultationId = parse_path_id(&id.to_string(), "consultation").unwrap();
        assert_eq!(parsed, id);

        let err = parse_path_id::<ConsultationId>("42", "consultation").unwrap_err();
        assert_eq!(err.to_string(), "Invalid consultation id");
    }

    #[test]
    fn test_format_errors_names_fields() {
        #[derive(Validate)]
        struct Body {
            #[validate(length(min = 1))]
            link: String,
        }

        let errors = Body {
            link: String::new(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(format_errors(&errors), "link is invalid");
    }
}

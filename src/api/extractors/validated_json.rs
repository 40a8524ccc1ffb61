//! Validated JSON extractor - Combines deserialization with validation.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::AppError;

/// JSON body that has passed its `validator` rules.
///
/// Both malformed JSON and failed rules are rejected with
/// [`AppError::Validation`]. Handlers that must authorize before looking at
/// the body take `Result<ValidatedJson<T>, AppError>` and unwrap it later.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::validation(format_validation_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Join field messages into one string, in field-name order
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Probe {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let request = json_request(r#"{"email": "a@example.com", "name": "A"}"#);
        let ValidatedJson(probe) = ValidatedJson::<Probe>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(probe.name, "A");
    }

    #[tokio::test]
    async fn test_rule_failures_are_joined() {
        let request = json_request(r#"{"email": "nope", "name": ""}"#);
        let result = ValidatedJson::<Probe>::from_request(request, &()).await;

        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Invalid email format, Name is required");
            }
            _ => panic!("expected validation error"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let request = json_request("{not json");
        let result = ValidatedJson::<Probe>::from_request(request, &()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

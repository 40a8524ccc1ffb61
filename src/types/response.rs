use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::{Paginated, PaginationMeta};

/// Standard response envelope: `{message, data?, meta?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PaginationMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn with_data(data: T, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta: None,
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn paginated(page: Paginated<T>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: Some(page.data),
            meta: Some(page.meta),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
            meta: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaginationParams;

    #[test]
    fn test_message_only_omits_data() {
        let json = serde_json::to_value(ApiResponse::message("User deleted successfully.")).unwrap();
        assert_eq!(json, serde_json::json!({"message": "User deleted successfully."}));
    }

    #[test]
    fn test_with_data() {
        let json = serde_json::to_value(ApiResponse::with_data(42, "ok")).unwrap();
        assert_eq!(json["data"], 42);
        assert!(json.get("meta").is_none());
    }

    #[test]
    fn test_paginated_includes_meta() {
        let page = Paginated::new(vec!["a", "b"], &PaginationParams::new(1, 2), 5);
        let json = serde_json::to_value(ApiResponse::paginated(page, "ok")).unwrap();
        assert_eq!(json["data"], serde_json::json!(["a", "b"]));
        assert_eq!(json["meta"]["total_pages"], 3);
    }
}

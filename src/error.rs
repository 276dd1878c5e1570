use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::ValidationIssue;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<ValidationIssue>),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("search backend error: {0}")]
    Provider(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(issues) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "message": "Validation failed",
                    "zodIssues": issues,
                })),
            )
                .into_response(),
            AppError::HttpClient(err) => internal_error(err.to_string()),
            AppError::Provider(message) => internal_error(message),
            AppError::Internal(message) => internal_error(message),
        }
    }
}

fn internal_error(detail: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "message": "Internal server error",
            "details": { "error": detail },
        })),
    )
        .into_response()
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IssueCode, PathSegment};
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_is_400_with_issue_list() {
        let issues = vec![ValidationIssue::new(
            IssueCode::InvalidBase64,
            vec![PathSegment::key("continuation")],
            "Input is not a valid base64 string",
        )];

        let response = AppError::Validation(issues).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["zodIssues"][0]["code"], "invalid_base64");
        assert_eq!(body["zodIssues"][0]["path"][0], "continuation");
    }

    #[tokio::test]
    async fn test_provider_error_is_500_with_details() {
        let response = AppError::Provider("backend exploded".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["details"]["error"], "backend exploded");
    }
}

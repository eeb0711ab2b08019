// SPDX-License-Identifier: Apache-2.0

//! HTTP error mapping.
//!
//! Converts core errors into status codes plus a JSON `{error}` body, so
//! handlers can use `?` and return domain errors directly.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use rampup_core::RampupError;

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Builds an error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<RampupError> for ApiError {
    fn from(err: RampupError) -> Self {
        let status = match &err {
            RampupError::InvalidRepoRef { .. } | RampupError::MissingApiKey { .. } => {
                StatusCode::BAD_REQUEST
            }
            RampupError::RepoNotFound { .. } | RampupError::JobNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            RampupError::AnalysisIncomplete => StatusCode::CONFLICT,
            RampupError::GitHubRateLimited | RampupError::RateLimited { .. } => {
                StatusCode::TOO_MANY_REQUESTS
            }
            RampupError::GitHub { .. }
            | RampupError::Ai { .. }
            | RampupError::TruncatedResponse { .. }
            | RampupError::Network(_) => StatusCode::BAD_GATEWAY,
            RampupError::InvalidAiResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Preserve the typed mapping when a core error sits at the root.
        match err.downcast::<RampupError>() {
            Ok(core) => core.into(),
            Err(other) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: other.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_expected_statuses() {
        let cases: Vec<(RampupError, StatusCode)> = vec![
            (
                RampupError::InvalidRepoRef { input: "x".into() },
                StatusCode::BAD_REQUEST,
            ),
            (
                RampupError::MissingApiKey {
                    provider: "groq".into(),
                    env_var: "GROQ_API_KEY".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                RampupError::JobNotFound { id: "j".into() },
                StatusCode::NOT_FOUND,
            ),
            (RampupError::AnalysisIncomplete, StatusCode::CONFLICT),
            (RampupError::GitHubRateLimited, StatusCode::TOO_MANY_REQUESTS),
            (
                RampupError::GitHub { message: "x".into() },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, expected, "{}", api.message);
        }
    }

    #[test]
    fn anyhow_with_core_root_keeps_typed_status() {
        let err = anyhow::anyhow!(RampupError::AnalysisIncomplete);
        let api: ApiError = err.into();
        assert_eq!(api.status, StatusCode::CONFLICT);

        let err = anyhow::anyhow!("something else");
        let api: ApiError = err.into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

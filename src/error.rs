use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Report \"/{0}\" does not exist")]
    InvalidSlug(String),

    #[error("Version \"{version}\" does not exist for \"{project_name}\".")]
    ReportNotFound {
        project_name: String,
        version: String,
    },

    #[error("Provide an \"X-Api-Key\" header")]
    MissingApiKey,

    #[error("Invalid API key")]
    InvalidApiKey,

    // Reported as an invalid key so probing the write path cannot reveal
    // which projects exist.
    #[error("Invalid API key")]
    ProjectNotFound,

    #[error("Project \"{0}\" is disabled")]
    ProjectDisabled(String),

    #[error("Missing \"mutationScore\" for a report without a result")]
    MissingScore,

    #[error("Invalid report body: {0}")]
    InvalidBody(String),

    #[error("Internal server error")]
    Storage(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Storage failures are opaque to the caller; detail stays in the logs.
        if let ApiError::Storage(_) = self {
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }

        let status = match &self {
            ApiError::InvalidSlug(_) | ApiError::ReportNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MissingApiKey | ApiError::InvalidApiKey | ApiError::ProjectNotFound => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::ProjectDisabled(_) => StatusCode::FORBIDDEN,
            ApiError::MissingScore | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => unreachable!(),
        };

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}

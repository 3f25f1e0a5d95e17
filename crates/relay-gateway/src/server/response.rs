//! Response and error handling for the HTTP endpoints

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_common::{AppError, ErrorResponse};
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),
}

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::App(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, "Server error occurred");
        }

        let body = match &self {
            Self::App(e) => ErrorResponse::from(e),
            Self::Validation(errors) => ErrorResponse {
                code: self.error_code().to_string(),
                message: first_validation_message(errors)
                    .unwrap_or_else(|| self.to_string()),
                details: Some(errors.to_string()),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// The first custom message attached to a failed field rule
fn first_validation_message(errors: &ValidationErrors) -> Option<String> {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(ToString::to_string))
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON body extractor that runs `validator` rules
///
/// Any body that does not deserialize is reported as `MALFORMED_BODY`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "Rejected request body");
            ApiError::App(AppError::MalformedBody)
        })?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use pledge_store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A solution cap rejected the submission.
    #[error("Limit reached: {0}")]
    LimitReached(String),

    /// Scoring precondition: the questionnaire must be fully answered.
    #[error("Questionnaire incomplete: {completion:.0}% of required sections answered")]
    IncompleteQuestionnaire { completion: f64 },

    /// Scoring precondition: the application fee must be settled first.
    #[error("Payment required before a score can be assigned")]
    PaymentRequired,

    /// Scoring precondition: the score must be a finite number in 0..=100.
    #[error("Invalid score {0}: must be a finite number between 0 and 100")]
    InvalidScore(f64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound("record not found".to_string()),
            other => {
                tracing::error!(error = %other, "store operation failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::LimitReached(_) => (StatusCode::CONFLICT, self.to_string()),
            ApiError::IncompleteQuestionnaire { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            ApiError::PaymentRequired => (StatusCode::PAYMENT_REQUIRED, self.to_string()),
            ApiError::InvalidScore(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            // Never leak internals to the caller.
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

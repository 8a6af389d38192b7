use axum::http::StatusCode;
use thiserror::Error;
use validator::ValidationErrors;

use crate::error::HttpError;

pub const INVALID_AI_RESPONSE: &str = "Invalid response format from AI";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Gemini API key is required. Save it in Settings or set GEMINI_API_KEY in the server environment.")]
    MissingApiKey,

    #[error("Upstream model error: {0}")]
    Upstream(String),

    #[error("{0}")]
    InvalidAiResponse(String),

    #[error("Could not read image: {0}")]
    ImageDecode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {0}")]
    InvalidFields(ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Upstream(err.to_string())
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ImageDecode(_) | ServiceError::Validation(_) | ServiceError::InvalidFields(_) => {
                StatusCode::BAD_REQUEST
            }

            ServiceError::MissingApiKey
            | ServiceError::Upstream(_)
            | ServiceError::InvalidAiResponse(_)
            | ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        if let ServiceError::InvalidFields(errors) = &error {
            return HttpError::validation(errors);
        }
        let status = error.status_code();
        let message = match &error {
            ServiceError::Upstream(_) | ServiceError::InvalidAiResponse(_) => {
                format!("Classification failed: {}", error)
            }
            _ => error.to_string(),
        };
        HttpError::new(message, status)
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::credentials::CredentialError;
use crate::storage::RegistrationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Activity not found")]
    ActivityNotFound,

    #[error("Student is already signed up")]
    AlreadyRegistered,

    #[error("Student is not signed up for this activity")]
    NotRegistered,

    #[error("Activity is full")]
    ActivityFull,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Credential file error: {0}")]
    ConfigLoad(#[from] CredentialError),

    #[error("Token signing error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ActivityNotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyRegistered | AppError::NotRegistered | AppError::ActivityFull => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::MissingParameter(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ConfigLoad(_) | AppError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::ActivityNotFound(_) => AppError::ActivityNotFound,
            RegistrationError::AlreadyRegistered { .. } => AppError::AlreadyRegistered,
            RegistrationError::NotRegistered { .. } => AppError::NotRegistered,
            RegistrationError::ActivityFull { .. } => AppError::ActivityFull,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            error!("{self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use crate::domain::UserDirectoryError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<UserDirectoryError> for ApiError {
    fn from(err: UserDirectoryError) -> Self {
        match err {
            UserDirectoryError::UserNotFound(_) | UserDirectoryError::DataFileNotFound => {
                Self::not_found(err.to_string())
            }
            UserDirectoryError::InvalidStructure => Self::bad_request(err.to_string()),
            UserDirectoryError::Table(ref e) => {
                tracing::error!("Table error: {:?}", e);
                Self::internal(format!("Failed to read data: {err}"))
            }
            UserDirectoryError::Store(ref e) => {
                tracing::error!("Store error: {:?}", e);
                Self::internal(format!("Failed to read data: {err}"))
            }
        }
    }
}

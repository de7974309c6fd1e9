use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

use crate::hosting::HostError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Upload form had no usable file field, or the multipart body was malformed
    #[error("{message}")]
    MissingFile { message: String },

    /// Local scratch-file create/write failure
    #[error("Failed to {operation} scratch file")]
    Storage {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Remote publish failure (scratch re-read or hosting API)
    #[error(transparent)]
    Hosting(#[from] HostError),

    /// Page template load/render failure
    #[error("Failed to render page")]
    Template(#[from] minijinja::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFile { .. } => StatusCode::BAD_REQUEST,
            Error::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Hosting(host_err) => match host_err {
                HostError::Read { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                HostError::Api(_) | HostError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            },
            Error::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingFile { message } => message.clone(),
            Error::Storage { .. } => "Failed to store the uploaded file".to_string(),
            Error::Hosting(host_err) => match host_err {
                HostError::Read { .. } => "Failed to read the stored upload".to_string(),
                HostError::Api(_) => "The image host rejected the upload".to_string(),
                HostError::InvalidResponse(_) => "The image host returned an unexpected response".to_string(),
            },
            Error::Template(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Storage { .. } | Error::Template(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Hosting(_) => {
                tracing::warn!("Publish error: {:#}", self);
            }
            Error::MissingFile { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

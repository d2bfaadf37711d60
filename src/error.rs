//! Error types for portal-info

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::types::ErrorBody;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API key is required and must be valid")]
    Unauthorized,

    #[error("Endpoint not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Public error envelope. Internal details never leave the process.
    pub fn body(&self) -> ErrorBody {
        match self {
            Error::Unauthorized => ErrorBody::unauthorized(),
            Error::NotFound => ErrorBody::not_found(),
            Error::Internal(_) => ErrorBody::internal(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_map_to_their_status() {
        assert_eq!(Error::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_are_hidden_from_body() {
        let body = Error::internal("database exploded").body();
        assert_eq!(body.error, "Internal Server Error");
        assert_eq!(body.message, "Something went wrong");
    }
}

use axum::{http::StatusCode, response::IntoResponse};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

use crate::handlers::respond_text;

#[derive(Debug, ThisError)]
pub enum BookstoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Vault login error: {0}")]
    VaultAuth(String),

    #[error("Vault secret error: {0}")]
    SecretFetch(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("no book with ISBN {0}")]
    NotFound(String),

    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BookstoreError {
    /// Status code sent to HTTP clients. Missing books are reported like any
    /// other data access failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BookstoreError::Decode(_) => StatusCode::BAD_REQUEST,
            BookstoreError::DatabaseError(_)
            | BookstoreError::NotFound(_)
            | BookstoreError::Config(_)
            | BookstoreError::UrlParse(_)
            | BookstoreError::Reqwest(_)
            | BookstoreError::VaultAuth(_)
            | BookstoreError::SecretFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BookstoreError {
    fn into_response(self) -> axum::response::Response {
        // Only the status text leaves the process; details stay in the logs.
        let status = self.status_code();
        respond_text(status, status.canonical_reason().unwrap_or_default())
    }
}

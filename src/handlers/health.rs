use axum::{extract::State, http::StatusCode, response::Response};
use tracing::error;

use super::respond_text;
use crate::{BookstoreError, router::BookstoreState};

/// GET /healthz and GET /readyz -> `OK` when the database answers.
pub async fn health_handler(
    State(state): State<BookstoreState>,
) -> Result<Response, BookstoreError> {
    state
        .health
        .check_connection()
        .await
        .inspect_err(|e| error!(error = %e, "database health check failed"))?;

    Ok(respond_text(StatusCode::OK, "OK"))
}

//! Request plumbing shared by the backend clients.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::error::{NotebookError, Result};

pub(crate) fn build_client(backend: &str, timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| NotebookError::Ai(format!("Failed to create {backend} HTTP client: {e}")))
}

pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Run `operation` unless `cancel` fires first.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(NotebookError::Cancelled),
        result = operation => result,
    }
}

/// Turn a non-success response into a typed error carrying the body.
pub(crate) async fn check_status(backend: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || body.contains("API_KEY_INVALID")
    {
        return Err(NotebookError::AiAuth(format!(
            "{backend} rejected the request credentials ({status}): {body}"
        )));
    }

    Err(NotebookError::Ai(format!(
        "{backend} returned {status}: {body}"
    )))
}

pub(crate) fn transport_error(backend: &str, timeout_secs: u64, error: reqwest::Error) -> NotebookError {
    if error.is_timeout() {
        NotebookError::Ai(format!(
            "{backend} request timed out after {timeout_secs}s"
        ))
    } else if error.is_decode() {
        NotebookError::Ai(format!("Failed to parse {backend} response: {error}"))
    } else {
        NotebookError::Ai(format!("{backend} request failed: {error}"))
    }
}

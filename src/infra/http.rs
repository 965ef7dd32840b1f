//! Shared HTTP plumbing: client construction and retry of idempotent calls.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::config::HttpConfig;

const USER_AGENT: &str = concat!("drone-import-dashboard/", env!("CARGO_PKG_VERSION"));
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

pub fn build_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout)
        .build()
}

/// Server-side hiccups worth another attempt.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

/// Linear backoff: 250 ms, 500 ms, 750 ms, ...
pub fn backoff(attempt: u32) -> Duration {
    RETRY_BASE_DELAY * attempt
}

/// Sends the request built by `make_request` up to `attempts` times,
/// retrying transport failures and retryable statuses. The last response is
/// returned as-is so callers can inspect non-success statuses.
pub async fn send_with_retry<F>(make_request: F, attempts: u32) -> Result<Response, reqwest::Error>
where
    F: Fn() -> RequestBuilder,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match make_request().send().await {
            Ok(response) if attempt < attempts && is_retryable_status(response.status()) => {
                log::warn!(
                    "{} answered {}; retrying ({attempt}/{attempts})",
                    response.url(),
                    response.status()
                );
            }
            Ok(response) => return Ok(response),
            Err(error) if attempt < attempts && is_retryable_error(&error) => {
                log::warn!("request failed: {error}; retrying ({attempt}/{attempts})");
            }
            Err(error) => return Err(error),
        }
        tokio::time::sleep(backoff(attempt)).await;
        attempt += 1;
    }
}

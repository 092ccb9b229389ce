//! Retry middleware for transient GlobalSearch failures.

use reqwest::{Request, Response, StatusCode};
use reqwest_middleware::{Middleware, Next};
use std::time::Duration;
use tracing::warn;

use crate::utils::fmt_duration;

/// Gateway and server errors that usually clear on their own.
const RETRY_STATUSES: [StatusCode; 4] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Retries transport errors and 500/502/503/504 responses with exponential backoff.
///
/// The n-th retry waits `backoff_factor * 2^(n-1)` seconds. POST requests are
/// retried too; the search form is read-only on the server side.
#[derive(Debug, Clone)]
pub struct TransientRetryMiddleware {
    max_retries: u32,
    backoff_factor: f64,
    retry_sent_requests: bool,
}

impl TransientRetryMiddleware {
    pub fn new(max_retries: u32, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            backoff_factor,
            retry_sent_requests: true,
        }
    }

    /// Only retry transport errors where no connection was made.
    ///
    /// For requests with side effects: a timeout or reset after the request
    /// went out may already have been acted on.
    pub fn connect_errors_only(mut self) -> Self {
        self.retry_sent_requests = false;
        self
    }

    /// Delay before the given retry (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16) as i32;
        Duration::from_secs_f64((self.backoff_factor * 2f64.powi(exponent)).max(0.0))
    }

    fn is_transient(&self, result: &reqwest_middleware::Result<Response>) -> bool {
        match result {
            Ok(response) => RETRY_STATUSES.contains(&response.status()),
            Err(reqwest_middleware::Error::Reqwest(e)) if e.is_connect() => true,
            Err(_) => self.retry_sent_requests,
        }
    }
}

#[async_trait::async_trait]
impl Middleware for TransientRetryMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let mut retry = 0;
        loop {
            // Streaming bodies cannot be replayed.
            let Some(attempt) = req.try_clone() else {
                return next.run(req, extensions).await;
            };

            let result = next.clone().run(attempt, extensions).await;
            if !self.is_transient(&result) || retry >= self.max_retries {
                return result;
            }

            retry += 1;
            let delay = self.backoff(retry);
            match &result {
                Ok(response) => warn!(
                    url = %req.url(),
                    status = response.status().as_u16(),
                    retry,
                    delay = fmt_duration(delay),
                    "Transient GlobalSearch response, retrying"
                ),
                Err(e) => warn!(
                    url = %req.url(),
                    error = ?e,
                    retry,
                    delay = fmt_duration(delay),
                    "GlobalSearch request failed, retrying"
                ),
            }
            tokio::time::sleep(delay).await;
        }
    }
}

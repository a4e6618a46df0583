//! Blocking HTTP fetch with retry, backoff and a circuit breaker.
//!
//! Shared by every network source. 403 trips the breaker immediately, 429
//! and 5xx count as failures and are retried with exponential backoff,
//! connect/timeout errors are retried, anything else fails fast.

use super::circuit_breaker::CircuitBreaker;
use crate::config::HttpConfig;
use crate::error::SourceError;
use std::time::Duration;

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    circuit_breaker: CircuitBreaker,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| SourceError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker: CircuitBreaker::new(
                Duration::from_secs(config.breaker_cooldown_secs),
                config.breaker_failure_threshold,
            ),
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
        })
    }

    pub fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }

    /// GET `url` and return the body as text.
    pub fn get_text(&self, url: &str) -> Result<String, SourceError> {
        if !self.circuit_breaker.is_allowed() {
            let remaining = self.circuit_breaker.remaining_cooldown();
            tracing::warn!(url, remaining_secs = remaining.as_secs(), "circuit breaker open, request refused");
            return Err(SourceError::CircuitBreakerTripped);
        }

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(url, attempt, ?delay, "retrying request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(SourceError::CircuitBreakerTripped);
            }

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::FORBIDDEN {
                        self.circuit_breaker.trip();
                        return Err(SourceError::CircuitBreakerTripped);
                    }

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        self.circuit_breaker.record_failure();
                        let retry_after = resp
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);
                        last_error = Some(SourceError::RateLimited {
                            retry_after_secs: retry_after,
                        });
                        continue;
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(SourceError::Other(format!("HTTP {status} for {url}")));
                    }

                    if !status.is_success() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(SourceError::Other(format!("HTTP {status} for {url}")));
                        continue;
                    }

                    let body = resp
                        .text()
                        .map_err(|e| SourceError::ResponseFormatChanged(format!("unreadable body: {e}")))?;
                    self.circuit_breaker.record_success();
                    return Ok(body);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(SourceError::NetworkUnreachable(e.to_string()));
                        continue;
                    }
                    return Err(SourceError::NetworkUnreachable(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SourceError::Other("max retries exceeded".into())))
    }
}

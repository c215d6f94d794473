//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client
//! - Rotating the client identity on every attempt
//! - Retrying transient failures with exponential backoff and jitter
//! - Honoring the run-wide cancellation signal while waiting

use crate::config::{FetchConfig, UserAgentConfig};
use crate::crawler::scheduler::PolitenessGate;
use crate::extract::Document;
use crate::FetchError;
use rand::seq::IndexedRandom;
use rand::Rng;
use reqwest::{header::USER_AGENT, Client};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Retry policy applied to every fetch
///
/// The wait after failed attempt `n` (1-based) is
/// `min(base_delay * 2^(n-1), max_delay)` plus a random jitter in
/// `[0, max_jitter]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_jitter: Duration,
}

impl RetryPolicy {
    /// Builds the policy from configuration
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            max_jitter: Duration::from_millis(config.max_jitter_ms),
        }
    }

    /// A policy that retries immediately, for tests and local runs
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// Exponential part of the wait after failed attempt `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Full wait after failed attempt `attempt`, jitter included
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff(attempt) + self.jitter()
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// Pool of client identity strings, one drawn at random per attempt
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    pub fn new(agents: Vec<String>) -> Self {
        Self { agents }
    }

    /// Picks an identity at random; an empty pool falls back to the crate name
    pub fn pick(&self) -> &str {
        self.agents
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
    }
}

impl From<&UserAgentConfig> for UserAgentPool {
    fn from(config: &UserAgentConfig) -> Self {
        Self::new(config.pool.clone())
    }
}

/// Builds the HTTP client shared by all fetches
///
/// The user agent is not set here; it is chosen per attempt.
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs GET requests under a retry policy
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
    identities: UserAgentPool,
    cancel: CancellationToken,
}

impl Fetcher {
    /// Creates a fetcher from configuration
    ///
    /// # Arguments
    ///
    /// * `fetch` - Retry and timeout settings
    /// * `user_agent` - Identity pool
    /// * `cancel` - Run-wide cancellation signal
    pub fn new(
        fetch: &FetchConfig,
        user_agent: &UserAgentConfig,
        cancel: CancellationToken,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(
            build_http_client(fetch)?,
            RetryPolicy::from_config(fetch),
            UserAgentPool::from(user_agent),
            cancel,
        ))
    }

    pub fn with_client(
        client: Client,
        policy: RetryPolicy,
        identities: UserAgentPool,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            policy,
            identities,
            cancel,
        }
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Returns
    ///
    /// * `Ok(Document)` - A 2xx response body
    /// * `Err(FetchError::Terminal)` - Every attempt failed
    /// * `Err(FetchError::Cancelled)` - The run was cancelled first
    pub async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        self.fetch_inner(url, None).await
    }

    /// Fetches a URL, waiting for the site's politeness gate before every attempt
    pub async fn fetch_gated(&self, url: &str, gate: &PolitenessGate) -> Result<Document, FetchError> {
        self.fetch_inner(url, Some(gate)).await
    }

    async fn fetch_inner(
        &self,
        url: &str,
        gate: Option<&PolitenessGate>,
    ) -> Result<Document, FetchError> {
        let cancelled = || FetchError::Cancelled {
            url: url.to_string(),
        };
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=self.policy.max_attempts {
            if let Some(gate) = gate {
                tokio::select! {
                    _ = self.cancel.cancelled() => return Err(cancelled()),
                    _ = gate.wait_turn() => {}
                }
            }
            if self.cancel.is_cancelled() {
                return Err(cancelled());
            }

            let identity = self.identities.pick();
            tracing::info!("GET '{}' (attempt {}/{})", url, attempt, self.policy.max_attempts);

            let result = tokio::select! {
                _ = self.cancel.cancelled() => return Err(cancelled()),
                result = self.attempt(url, identity) => result,
            };

            match result {
                Ok(document) => return Ok(document),
                Err(FetchError::Transient { reason, .. }) => {
                    tracing::warn!("GET '{}' failed on attempt {}: {}", url, attempt, reason);
                    last_error = reason;
                }
                Err(other) => return Err(other),
            }

            if attempt < self.policy.max_attempts {
                let delay = self.policy.delay(attempt);
                tracing::debug!("Retrying '{}' in {:?}", url, delay);
                tokio::select! {
                    _ = self.cancel.cancelled() => return Err(cancelled()),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        Err(FetchError::Terminal {
            url: url.to_string(),
            attempts: self.policy.max_attempts,
            last: last_error,
        })
    }

    /// Makes a single request
    async fn attempt(&self, url: &str, identity: &str) -> Result<Document, FetchError> {
        let transient = |reason: String| FetchError::Transient {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, identity)
            .send()
            .await
            .map_err(|e| transient(classify_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transient(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transient(format!("unreadable body: {}", e)))?;

        Ok(Document::new(url, body))
    }
}

/// Describes a transport error for logging
fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}

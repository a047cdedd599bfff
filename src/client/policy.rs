//! Retry policy: decides, per failed attempt, whether to try again and how long to wait.
//!
//! The decision depends only on the attempt outcome, the attempt number and the
//! immutable [`RetryConfig`], so it can be exercised without any network.

use crate::transport::TransportErrorKind;
use crate::{Error, ErrorContext, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a single attempt produced, as far as the policy cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No response arrived.
    Transport(TransportErrorKind),
    /// A response arrived with this status.
    Status(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry { delay: Duration },
    Stop,
}

/// Jitter applied on top of the exponential delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jitter {
    /// Always wait the capped exponential delay.
    #[default]
    None,
    /// Wait a uniformly random duration in `[0, delay]`.
    Full,
}

/// Pluggable retry decision. Implementations must be stateless per call:
/// everything they need arrives through the arguments.
pub trait RetryStrategy: Send + Sync {
    /// `attempt` is the 1-based number of the attempt that just finished.
    fn decide(&self, outcome: Outcome, attempt: u32) -> Decision;
}

/// Retry configuration shared by every request of one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retries; total attempts never exceed `retry_limit + 1`.
    pub retry_limit: u32,
    pub retryable_statuses: Vec<u16>,
    pub retryable_transport_kinds: Vec<TransportErrorKind>,
    pub backoff_base: f64,
    pub backoff_scale_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_limit: 3,
            retryable_statuses: (500..=599).collect(),
            retryable_transport_kinds: vec![
                TransportErrorKind::Timeout,
                TransportErrorKind::CannotConnectToHost,
                TransportErrorKind::ConnectionLost,
                TransportErrorKind::DnsLookupFailed,
                TransportErrorKind::NoConnection,
            ],
            backoff_base: 2.0,
            backoff_scale_ms: 500,
            max_delay_ms: 30_000,
            jitter: Jitter::None,
        }
    }
}

impl RetryConfig {
    /// A configuration that never retries.
    pub fn disabled() -> Self {
        Self {
            retry_limit: 0,
            ..Self::default()
        }
    }

    pub fn with_retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = limit;
        self
    }

    pub fn with_backoff(mut self, base: f64, scale: Duration) -> Self {
        self.backoff_base = base;
        self.backoff_scale_ms = scale.as_millis() as u64;
        self
    }

    pub fn with_max_delay(mut self, max: Duration) -> Self {
        self.max_delay_ms = max.as_millis() as u64;
        self
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_retryable_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_retryable_transport_kinds(
        mut self,
        kinds: impl IntoIterator<Item = TransportErrorKind>,
    ) -> Self {
        self.retryable_transport_kinds = kinds.into_iter().collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.backoff_base.is_finite() || self.backoff_base < 1.0 {
            return Err(Error::configuration_with_context(
                format!("backoff base must be >= 1.0, got {}", self.backoff_base),
                ErrorContext::new()
                    .with_field_path("retry.backoff_base")
                    .with_source("retry_config"),
            ));
        }
        if let Some(status) = self
            .retryable_statuses
            .iter()
            .find(|s| (200..300).contains(*s))
        {
            return Err(Error::configuration_with_context(
                format!("success status {} cannot be retryable", status),
                ErrorContext::new()
                    .with_field_path("retry.retryable_statuses")
                    .with_source("retry_config"),
            ));
        }
        Ok(())
    }
}

/// Exponential backoff policy driven by a [`RetryConfig`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Capped delay before retrying after failed attempt `attempt` (1-based):
    /// `scale * base^attempt`, without jitter.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let raw = self.config.backoff_scale_ms as f64 * self.config.backoff_base.powi(exponent);
        let cap = self.config.max_delay_ms as f64;
        let ms = if raw.is_finite() { raw.min(cap) } else { cap };
        Duration::from_millis(ms.max(0.0) as u64)
    }

    fn is_retryable(&self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Status(status) if (200..300).contains(&status) => false,
            Outcome::Status(status) => self.config.retryable_statuses.contains(&status),
            Outcome::Transport(kind) => self.config.retryable_transport_kinds.contains(&kind),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryStrategy for RetryPolicy {
    fn decide(&self, outcome: Outcome, attempt: u32) -> Decision {
        if !self.is_retryable(outcome) || attempt > self.config.retry_limit {
            return Decision::Stop;
        }

        let delay = self.backoff_delay(attempt);
        let delay = match self.config.jitter {
            Jitter::None => delay,
            Jitter::Full => {
                let cap = delay.as_millis().min(u64::MAX as u128) as u64;
                Duration::from_millis(rand::thread_rng().gen_range(0..=cap))
            }
        };
        Decision::Retry { delay }
    }
}

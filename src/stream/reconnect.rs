//! Reconnecting subscription
//!
//! Wraps any [`Subscription`] and reopens it with exponential backoff after
//! an interruption. The wrapped listener only sees `Interrupted` followed by
//! either `Reopened` or, once attempts are exhausted, `Closed`.

use async_trait::async_trait;
use std::time::Duration;

use super::error::StreamResult;
use super::subscription::{StreamEvent, Subscription};
use crate::config::ReconnectConfig;

/// Backoff schedule for reopening a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&ReconnectConfig::default())
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the given zero-based attempt: `min(base * 2^attempt, max)`
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

/// Subscription decorator that reopens after interruptions
pub struct Reconnecting<S> {
    inner: S,
    policy: ReconnectPolicy,
    needs_reopen: bool,
    exhausted: bool,
}

impl<S: Subscription> Reconnecting<S> {
    pub fn new(inner: S, policy: ReconnectPolicy) -> Self {
        Self {
            inner,
            policy,
            needs_reopen: false,
            exhausted: false,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Retry `open` on the schedule; the counter starts fresh on every call
    async fn reopen(&mut self) -> StreamResult<()> {
        let mut attempt = 0;
        loop {
            let delay = self.policy.delay(attempt);
            attempt += 1;
            tracing::info!(
                attempt,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Reconnecting to sentiment stream"
            );
            tokio::time::sleep(delay).await;

            match self.inner.open().await {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= self.policy.max_attempts => {
                    tracing::error!(error = %e, "Max reconnect attempts reached");
                    return Err(e);
                }
                Err(e) => tracing::warn!(attempt, error = %e, "Reconnect attempt failed"),
            }
        }
    }
}

#[async_trait]
impl<S: Subscription> Subscription for Reconnecting<S> {
    async fn open(&mut self) -> StreamResult<()> {
        self.exhausted = false;
        self.needs_reopen = false;

        match self.inner.open().await {
            Ok(()) => Ok(()),
            Err(e) if self.policy.max_attempts == 0 => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Initial stream connection failed");
                self.reopen().await
            }
        }
    }

    async fn recv(&mut self) -> StreamEvent {
        if self.exhausted {
            return StreamEvent::Closed;
        }

        if self.needs_reopen {
            if self.policy.max_attempts == 0 {
                self.exhausted = true;
                return StreamEvent::Closed;
            }
            return match self.reopen().await {
                Ok(()) => {
                    self.needs_reopen = false;
                    StreamEvent::Reopened
                }
                Err(_) => {
                    self.exhausted = true;
                    StreamEvent::Closed
                }
            };
        }

        match self.inner.recv().await {
            StreamEvent::Interrupted(err) => {
                self.needs_reopen = true;
                StreamEvent::Interrupted(err)
            }
            event => event,
        }
    }

    async fn close(&mut self) {
        self.exhausted = true;
        self.inner.close().await;
    }
}

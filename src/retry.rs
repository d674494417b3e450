//! Retry-with-backoff controller
//!
//! Wraps a single asynchronous operation at a time, waiting an exponentially
//! growing delay before each invocation. The controller never loops on its
//! own: the owner of the operation decides whether to ask for another retry
//! and resets the attempt count after a success.
//!
//! State changes are published through a `tokio::sync::watch` channel so
//! observers can render "retrying (attempt N)" without polling.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(5000);

/// Backoff bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Number of retries allowed before the controller gives up
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Cap applied to every delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryConfig {
    /// `min(base_delay * 2^attempt, max_delay)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPhase {
    #[default]
    Idle,
    /// A retry is waiting out its delay or running
    Retrying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryState {
    pub attempt_count: u32,
    pub is_retrying: bool,
}

impl RetryState {
    pub fn phase(&self) -> RetryPhase {
        if self.is_retrying {
            RetryPhase::Retrying
        } else {
            RetryPhase::Idle
        }
    }
}

pub struct RetryController {
    config: RetryConfig,
    state: watch::Sender<RetryState>,
    /// Token for the current retry cycle. Cancelling replaces it, and every
    /// state change made on behalf of a retry happens under this lock after
    /// checking that retry's token.
    cancel: Mutex<CancellationToken>,
}

impl RetryController {
    pub fn new(config: RetryConfig) -> Self {
        let (state, _) = watch::channel(RetryState::default());
        Self {
            config,
            state,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn state(&self) -> RetryState {
        *self.state.borrow()
    }

    pub fn phase(&self) -> RetryPhase {
        self.state().phase()
    }

    pub fn subscribe(&self) -> watch::Receiver<RetryState> {
        self.state.subscribe()
    }

    /// True once `max_attempts` retries have been spent
    pub fn exhausted(&self) -> bool {
        self.state().attempt_count >= self.config.max_attempts
    }

    /// Token of the current retry cycle; cancelled by the next `cancel()`
    pub fn token(&self) -> CancellationToken {
        self.lock_cancel().clone()
    }

    /// Zero the attempt count after the operation has succeeded
    pub fn reset(&self) {
        self.state.send_modify(|state| state.attempt_count = 0);
    }

    /// Abort any pending delay. The aborted retry leaves the state untouched
    /// from here on; later retries run under a fresh token.
    pub fn cancel(&self) {
        let mut token = self.lock_cancel();
        token.cancel();
        *token = CancellationToken::new();
        self.state.send_modify(|state| state.is_retrying = false);
    }

    /// Wait the backoff delay for the current attempt count, then invoke
    /// `operation` once. Returns whether it succeeded.
    ///
    /// Returns `false` without waiting when retries are exhausted, and
    /// `false` without invoking `operation` when cancelled during the delay.
    pub async fn retry_with_backoff<F, Fut, T, E>(&self, operation: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let token = self.token();
        self.retry_with_token(&token, operation).await
    }

    /// Like `retry_with_backoff`, bound to a token the caller captured
    /// earlier, so a retry requested by a superseded cycle is refused.
    pub async fn retry_with_token<F, Fut, T, E>(&self, token: &CancellationToken, operation: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let delay = {
            let _guard = self.lock_cancel();
            if token.is_cancelled() || self.exhausted() {
                return false;
            }
            let attempt = self.state().attempt_count;
            self.state.send_modify(|state| state.is_retrying = true);
            self.config.delay_for(attempt)
        };

        log::debug!("Retrying in {:?}", delay);
        tokio::select! {
            _ = token.cancelled() => return false,
            _ = tokio::time::sleep(delay) => {}
        }

        {
            let _guard = self.lock_cancel();
            if token.is_cancelled() {
                return false;
            }
            self.state.send_modify(|state| state.attempt_count += 1);
        }

        let succeeded = operation().await.is_ok();

        let _guard = self.lock_cancel();
        if !token.is_cancelled() {
            self.state.send_modify(|state| state.is_retrying = false);
        }
        succeeded
    }

    fn lock_cancel(&self) -> MutexGuard<'_, CancellationToken> {
        self.cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RetryController {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_sequence() {
        let config = RetryConfig::default();
        let delays: Vec<u128> = (0..7).map(|n| config.delay_for(n).as_millis()).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 5000, 5000, 5000, 5000]);
    }

    #[test]
    fn test_delay_does_not_overflow() {
        let config = RetryConfig::default().with_max_delay(Duration::from_secs(3600));
        assert_eq!(config.delay_for(40), Duration::from_secs(3600));
        assert_eq!(config.delay_for(u32::MAX), Duration::from_secs(3600));
    }

    #[test]
    fn test_initial_state() {
        let controller = RetryController::default();
        assert_eq!(controller.state(), RetryState::default());
        assert_eq!(controller.phase(), RetryPhase::Idle);
        assert!(!controller.exhausted());
    }
}

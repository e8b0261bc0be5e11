// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polling configuration.

use std::time::Duration;

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default number of polls between device-info and preset reads.
pub const DEFAULT_SLOW_REFRESH_EVERY: u32 = 6;

/// Default number of consecutive failures before `Degraded`.
pub const DEFAULT_DEGRADED_THRESHOLD: u32 = 3;

/// Configuration for the polling coordinator.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use novastar_lib::coordinator::{BackoffPolicy, CoordinatorConfig};
///
/// let config = CoordinatorConfig::new()
///     .with_poll_interval(Duration::from_secs(5))
///     .with_degraded_threshold(2)
///     .with_backoff(BackoffPolicy::new().with_max_delay(Duration::from_secs(30)));
/// assert_eq!(config.poll_interval(), Duration::from_secs(5));
/// assert_eq!(config.degraded_threshold(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    poll_interval: Duration,
    slow_refresh_every: u32,
    degraded_threshold: u32,
    backoff: BackoffPolicy,
}

impl CoordinatorConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the slow-refresh cadence. `0` is treated as `1`.
    #[must_use]
    pub fn with_slow_refresh_every(mut self, polls: u32) -> Self {
        self.slow_refresh_every = polls.max(1);
        self
    }

    /// Sets the degraded threshold. `0` is treated as `1`.
    #[must_use]
    pub fn with_degraded_threshold(mut self, failures: u32) -> Self {
        self.degraded_threshold = failures.max(1);
        self
    }

    /// Sets the backoff policy.
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay between polls while healthy.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Device info and presets are re-read on every Nth poll. Never zero.
    #[must_use]
    pub fn slow_refresh_every(&self) -> u32 {
        self.slow_refresh_every
    }

    /// Consecutive transient failures that move the coordinator to
    /// `Degraded`. Never zero.
    #[must_use]
    pub fn degraded_threshold(&self) -> u32 {
        self.degraded_threshold
    }

    /// Delay schedule while `Degraded`.
    #[must_use]
    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Returns the delay before the next poll.
    ///
    /// Below the threshold the regular interval applies; from the threshold
    /// on the backoff schedule takes over.
    #[must_use]
    pub fn next_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures < self.degraded_threshold {
            self.poll_interval
        } else {
            self.backoff
                .delay_for_attempt(consecutive_failures - self.degraded_threshold)
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            slow_refresh_every: DEFAULT_SLOW_REFRESH_EVERY,
            degraded_threshold: DEFAULT_DEGRADED_THRESHOLD,
            backoff: BackoffPolicy::default(),
        }
    }
}

/// Exponential backoff applied while the device is unreachable.
///
/// The default schedule is 10s, 30s, then 60s for every later attempt.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Delay for the first degraded attempt.
    pub initial_delay: Duration,
    /// Upper bound for any delay.
    pub max_delay: Duration,
    /// Multiplier applied per attempt.
    pub multiplier: f32,
}

impl BackoffPolicy {
    /// Creates a backoff policy with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial delay.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the multiplier.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f32) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Calculates the delay for a given attempt, starting at zero.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.initial_delay.min(self.max_delay);
        }

        let multiplier = self
            .multiplier
            .powi(i32::try_from(attempt).unwrap_or(i32::MAX));

        #[allow(clippy::cast_precision_loss)]
        let delay_ms = self.initial_delay.as_millis() as f32 * multiplier;

        // Saturating float-to-int cast; infinities clamp to u64::MAX.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let delay = Duration::from_millis(delay_ms as u64);

        delay.min(self.max_delay)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(60),
            multiplier: 3.0,
        }
    }
}

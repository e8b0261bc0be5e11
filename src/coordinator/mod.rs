// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polling coordinator.
//!
//! The [`Coordinator`] owns the cached [`DeviceSnapshot`] of one processor.
//! A background task polls the device on an interval; callers may also ask
//! for a refresh at any time. At most one poll is in flight: a refresh
//! requested while a poll is running receives that poll's result.
//!
//! # Failure handling
//!
//! | Error kind | Effect |
//! |------------|--------|
//! | `ConnectionRefused`, `Timeout`, `MalformedResponse`, `CodecError` | availability drops, counts toward `Degraded` |
//! | `AuthFailed` | coordinator stops and reports [`StopReason::AuthFailed`] |
//!
//! # Examples
//!
//! ```no_run
//! use novastar_lib::coordinator::{Coordinator, CoordinatorConfig};
//! use novastar_lib::protocol::{ApiClient, ConnectionParams};
//!
//! # async fn example() -> novastar_lib::Result<()> {
//! let client = ApiClient::new(ConnectionParams::new("192.168.21.99"))?;
//! let coordinator = Coordinator::new(client, CoordinatorConfig::default());
//! coordinator.start();
//!
//! let snapshot = coordinator.refresh().await?;
//! println!("power: {}", snapshot.power());
//!
//! coordinator.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod single_flight;
mod state;

pub use config::{
    BackoffPolicy, CoordinatorConfig, DEFAULT_DEGRADED_THRESHOLD, DEFAULT_POLL_INTERVAL,
    DEFAULT_SLOW_REFRESH_EVERY,
};
pub use state::{CoordinatorState, StopReason};

use std::sync::{Arc, Weak};

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, ErrorKind, Result};
use crate::protocol::ApiClient;
use crate::response::{DeviceInfo, StatusResponse};
use crate::state::DeviceSnapshot;
use crate::subscription::{CallbackRegistry, SubscriptionId};
use crate::types::Preset;

use single_flight::{Flight, FlightGuard, SingleFlight};

type PollOutcome = Result<Arc<DeviceSnapshot>>;

/// Keeps the cached state of one device in sync.
///
/// Cloning is cheap; clones share the same snapshot, poll task and
/// subscribers. The poll task stops when [`shutdown`](Self::shutdown) is
/// called, when the device rejects the credentials, or when the last clone
/// is dropped.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

struct Inner {
    client: ApiClient,
    config: CoordinatorConfig,
    snapshot: RwLock<Arc<DeviceSnapshot>>,
    state: watch::Sender<CoordinatorState>,
    counters: Mutex<PollCounters>,
    flight: SingleFlight<PollOutcome>,
    callbacks: CallbackRegistry,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Debug, Default)]
struct PollCounters {
    polls: u32,
    consecutive_failures: u32,
}

impl Coordinator {
    /// Creates a coordinator. Polling begins with [`start`](Self::start).
    #[must_use]
    pub fn new(client: ApiClient, config: CoordinatorConfig) -> Self {
        let (state, _) = watch::channel(CoordinatorState::Initializing);
        Self {
            inner: Arc::new(Inner {
                client,
                config,
                snapshot: RwLock::new(Arc::new(DeviceSnapshot::new())),
                state,
                counters: Mutex::new(PollCounters::default()),
                flight: SingleFlight::new(),
                callbacks: CallbackRegistry::new(),
                cancel: CancellationToken::new(),
                task: Mutex::new(None),
            }),
        }
    }

    /// Returns the API client used for polling.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    /// Returns the coordinator configuration.
    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    // ========== State access ==========

    /// Returns the current snapshot without touching the network.
    #[must_use]
    pub fn snapshot(&self) -> Arc<DeviceSnapshot> {
        self.inner.snapshot()
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        self.inner.state.borrow().clone()
    }

    /// Returns a receiver that observes lifecycle transitions.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<CoordinatorState> {
        self.inner.state.subscribe()
    }

    /// Returns `true` while a poll is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.flight.in_flight()
    }

    // ========== Subscriptions ==========

    /// Registers a callback for changed snapshots.
    ///
    /// See [`CallbackRegistry::subscribe`].
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceSnapshot) + Send + Sync + 'static,
    {
        self.inner.callbacks.subscribe(callback)
    }

    /// Registers a callback that holds only a weak reference to `target`.
    ///
    /// See [`CallbackRegistry::subscribe_weak`].
    pub fn subscribe_weak<T, F>(&self, target: &Arc<T>, callback: F) -> SubscriptionId
    where
        T: Send + Sync + 'static,
        F: Fn(&T, &DeviceSnapshot) + Send + Sync + 'static,
    {
        self.inner.callbacks.subscribe_weak(target, callback)
    }

    /// Removes a subscription. Returns `true` if it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.callbacks.unsubscribe(id)
    }

    // ========== Lifecycle ==========

    /// Starts the background poll task.
    ///
    /// The first poll runs immediately unless a poll has already succeeded,
    /// in which case the task waits one interval. Calling `start` again, or
    /// after the coordinator stopped, has no effect.
    pub fn start(&self) {
        if self.inner.state.borrow().is_stopped() {
            return;
        }
        let mut task = self.inner.task.lock();
        if task.is_some() {
            return;
        }

        let immediate = self.inner.snapshot().last_updated().is_none();
        tracing::debug!(
            url = %self.inner.client.base_url(),
            interval = ?self.inner.config.poll_interval(),
            "Starting poll task"
        );
        *task = Some(tokio::spawn(poll_task(
            Arc::downgrade(&self.inner),
            self.inner.cancel.clone(),
            immediate,
        )));
    }

    /// Polls the device now, or joins the poll already in flight.
    ///
    /// # Errors
    ///
    /// Returns the poll's error, or [`Error::Stopped`] if the coordinator has
    /// stopped or stops while the poll is running. A poll that ends without
    /// a result while the coordinator keeps running yields
    /// [`Error::Aborted`].
    pub async fn refresh(&self) -> Result<Arc<DeviceSnapshot>> {
        if self.inner.state.borrow().is_stopped() {
            return Err(Error::Stopped);
        }

        let rx = match self.inner.flight.join() {
            Flight::Leader(rx) => {
                let inner = Arc::clone(&self.inner);
                tokio::spawn(async move {
                    let guard = FlightGuard::new(&inner.flight);
                    let outcome = tokio::select! {
                        biased;
                        () = inner.cancel.cancelled() => Err(Error::Stopped),
                        outcome = inner.poll_once() => outcome,
                    };
                    guard.complete(&outcome);
                });
                rx
            }
            Flight::Follower(rx) => {
                tracing::trace!("Joining in-flight poll");
                rx
            }
        };

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) if self.inner.state.borrow().is_stopped() => Err(Error::Stopped),
            Err(_) => {
                tracing::warn!(url = %self.inner.client.base_url(), "Poll ended without a result");
                Err(Error::Aborted)
            }
        }
    }

    /// Stops polling and cancels any request in flight.
    ///
    /// Safe to call more than once. Waits for the poll task to exit.
    pub async fn shutdown(&self) {
        if self.inner.stop(StopReason::Shutdown) {
            tracing::info!(url = %self.inner.client.base_url(), "Coordinator shut down");
        }
        let handle = self.inner.task.lock().take();
        if let Some(handle) = handle {
            // A panicked poll task has nothing left to clean up.
            let _ = handle.await;
        }
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("url", &self.inner.client.base_url())
            .field("state", &*self.inner.state.borrow())
            .field("subscribers", &self.inner.callbacks.len())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn snapshot(&self) -> Arc<DeviceSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Runs one poll and publishes its outcome.
    async fn poll_once(&self) -> PollOutcome {
        let previous = self.snapshot();
        let slow = {
            let mut counters = self.counters.lock();
            let due = counters.polls % self.config.slow_refresh_every().max(1) == 0;
            counters.polls = counters.polls.wrapping_add(1);
            // Info and presets are fetched together, so missing info means
            // neither has been read yet. An empty preset list is a valid answer.
            due || previous.device_info().is_none()
        };

        match self.fetch(slow).await {
            Ok((status, info, presets)) => {
                let next = Arc::new(previous.updated(&status, info, presets, Utc::now()));
                self.counters.lock().consecutive_failures = 0;
                self.transition(CoordinatorState::Polling);
                self.publish(&previous, Arc::clone(&next));
                Ok(next)
            }
            Err(err) => {
                self.record_failure(&err);
                self.publish(&previous, Arc::new(previous.unavailable()));
                Err(err)
            }
        }
    }

    async fn fetch(
        &self,
        slow: bool,
    ) -> Result<(StatusResponse, Option<DeviceInfo>, Option<Vec<Preset>>)> {
        let status = self.client.get_status().await?;
        if !slow {
            return Ok((status, None, None));
        }
        let (info, presets) =
            tokio::try_join!(self.client.get_device_info(), self.client.list_presets())?;
        Ok((status, Some(info), Some(presets)))
    }

    fn record_failure(&self, err: &Error) {
        let url = self.client.base_url();

        if err.is_auth_failure() {
            tracing::error!(url = %url, error = %err, "Authentication failed, polling stopped");
            self.stop(StopReason::AuthFailed(err.to_string()));
            return;
        }

        let failures = {
            let mut counters = self.counters.lock();
            counters.consecutive_failures = counters.consecutive_failures.saturating_add(1);
            counters.consecutive_failures
        };

        match err.kind() {
            ErrorKind::MalformedResponse => {
                tracing::warn!(url = %url, failures, error = %err, "Device sent a malformed response");
            }
            ErrorKind::CodecError => {
                tracing::warn!(url = %url, failures, error = %err, "Could not decode device payload");
            }
            kind => {
                tracing::warn!(url = %url, failures, %kind, error = %err, "Poll failed");
            }
        }

        if failures >= self.config.degraded_threshold().max(1) {
            self.transition(CoordinatorState::Degraded);
        }
    }

    /// Swaps in `next` and notifies subscribers if anything but the
    /// timestamp changed.
    fn publish(&self, previous: &DeviceSnapshot, next: Arc<DeviceSnapshot>) {
        *self.snapshot.write() = Arc::clone(&next);
        if !previous.same_state(&next) {
            self.callbacks.dispatch(&next);
        }
    }

    /// Moves to a non-terminal state. `Stopped` is never left.
    fn transition(&self, to: CoordinatorState) {
        let url = self.client.base_url();
        self.state.send_if_modified(|current| {
            if current.is_stopped() || *current == to {
                return false;
            }
            tracing::info!(url = %url, from = %current, to = %to, "Coordinator state changed");
            *current = to.clone();
            true
        });
    }

    /// Enters `Stopped` and cancels outstanding work. Returns `false` if the
    /// coordinator was already stopped.
    fn stop(&self, reason: StopReason) -> bool {
        let changed = self.state.send_if_modified(|current| {
            if current.is_stopped() {
                return false;
            }
            *current = CoordinatorState::Stopped(reason);
            true
        });
        self.cancel.cancel();
        changed
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Background poll loop.
///
/// Holds only a weak reference between polls so that dropping every
/// [`Coordinator`] handle ends the task.
async fn poll_task(weak: Weak<Inner>, cancel: CancellationToken, immediate: bool) {
    let mut first = immediate;
    loop {
        let delay = if first {
            std::time::Duration::ZERO
        } else {
            let Some(inner) = weak.upgrade() else { break };
            let failures = inner.counters.lock().consecutive_failures;
            inner.config.next_delay(failures)
        };
        first = false;

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        let Some(inner) = weak.upgrade() else { break };
        let coordinator = Coordinator { inner };
        // Outcomes are published through the snapshot and state channel.
        let _ = coordinator.refresh().await;
    }
    tracing::debug!("Poll task exited");
}

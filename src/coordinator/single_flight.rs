// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coalescing of concurrent refresh requests.

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Shares one in-flight operation between every caller that asks for it.
///
/// The first caller to [`join`](Self::join) while nothing is in flight
/// becomes the leader and must start the operation; later callers only
/// wait. [`complete`](Self::complete) fans the single result out to all of
/// them and clears the slot, so the next `join` starts a fresh operation.
pub(crate) struct SingleFlight<T> {
    waiters: Mutex<Option<Vec<oneshot::Sender<T>>>>,
}

/// Role assigned by [`SingleFlight::join`].
pub(crate) enum Flight<T> {
    /// Start the operation, then wait on the receiver like everyone else.
    Leader(oneshot::Receiver<T>),
    /// An operation is already running.
    Follower(oneshot::Receiver<T>),
}

impl<T: Clone> SingleFlight<T> {
    pub(crate) fn new() -> Self {
        Self {
            waiters: Mutex::new(None),
        }
    }

    pub(crate) fn join(&self) -> Flight<T> {
        let (tx, rx) = oneshot::channel();
        let mut waiters = self.waiters.lock();
        if let Some(list) = waiters.as_mut() {
            list.push(tx);
            Flight::Follower(rx)
        } else {
            *waiters = Some(vec![tx]);
            Flight::Leader(rx)
        }
    }

    /// Delivers `value` to every waiter and ends the flight.
    pub(crate) fn complete(&self, value: &T) {
        let waiters = self.waiters.lock().take().unwrap_or_default();
        for waiter in waiters {
            // The caller may have been cancelled; nothing to deliver then.
            let _ = waiter.send(value.clone());
        }
    }

    /// Ends the flight without a result. Waiters observe a closed channel.
    pub(crate) fn abandon(&self) {
        self.waiters.lock().take();
    }

    pub(crate) fn in_flight(&self) -> bool {
        self.waiters.lock().is_some()
    }
}

/// Held by the leader task. Abandons the flight if the task is dropped
/// before [`complete`](Self::complete) runs.
pub(crate) struct FlightGuard<'a, T: Clone> {
    flight: &'a SingleFlight<T>,
    done: bool,
}

impl<'a, T: Clone> FlightGuard<'a, T> {
    pub(crate) fn new(flight: &'a SingleFlight<T>) -> Self {
        Self {
            flight,
            done: false,
        }
    }

    pub(crate) fn complete(mut self, value: &T) {
        self.flight.complete(value);
        self.done = true;
    }
}

impl<T: Clone> Drop for FlightGuard<'_, T> {
    fn drop(&mut self) {
        if !self.done {
            self.flight.abandon();
        }
    }
}

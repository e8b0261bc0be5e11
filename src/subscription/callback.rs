// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for snapshot subscriptions.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry that stores and dispatches callbacks

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::state::DeviceSnapshot;

/// Unique identifier for a subscription.
///
/// Returned when subscribing and used to unsubscribe later. IDs are unique
/// within one coordinator's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Returns `false` once the subscriber is gone and the entry can be pruned.
type SnapshotCallback = Arc<dyn Fn(&DeviceSnapshot) -> bool + Send + Sync>;

/// Registry of snapshot subscribers.
///
/// Callbacks run synchronously on the task that published the snapshot, in
/// no particular order. The registry lock is not held while they run, so a
/// callback may subscribe or unsubscribe.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    callbacks: RwLock<HashMap<SubscriptionId, SnapshotCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a callback that receives every changed snapshot.
    ///
    /// The registry owns the closure. Capture a [`Weak`] handle to anything
    /// the callback should not keep alive, or use
    /// [`subscribe_weak`](Self::subscribe_weak).
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceSnapshot) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.callbacks.write().insert(
            id,
            Arc::new(move |snapshot: &DeviceSnapshot| {
                callback(snapshot);
                true
            }),
        );
        id
    }

    /// Registers a callback bound to a subscriber the registry does not own.
    ///
    /// The registry keeps only a weak reference to `target`. Once the target
    /// is dropped the subscription is removed on the next dispatch.
    pub fn subscribe_weak<T, F>(&self, target: &Arc<T>, callback: F) -> SubscriptionId
    where
        T: Send + Sync + 'static,
        F: Fn(&T, &DeviceSnapshot) + Send + Sync + 'static,
    {
        let weak: Weak<T> = Arc::downgrade(target);
        let id = self.next_id();
        self.callbacks.write().insert(
            id,
            Arc::new(move |snapshot: &DeviceSnapshot| match weak.upgrade() {
                Some(target) => {
                    callback(&target, snapshot);
                    true
                }
                None => false,
            }),
        );
        id
    }

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.callbacks.write().clear();
    }

    /// Delivers a snapshot to every subscriber.
    pub fn dispatch(&self, snapshot: &DeviceSnapshot) {
        let callbacks: Vec<(SubscriptionId, SnapshotCallback)> = self
            .callbacks
            .read()
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect();

        let mut dead = Vec::new();
        for (id, callback) in callbacks {
            if !callback(snapshot) {
                dead.push(id);
            }
        }

        if !dead.is_empty() {
            let mut map = self.callbacks.write();
            for id in dead {
                tracing::debug!(subscription = %id, "Pruning dropped subscriber");
                map.remove(&id);
            }
        }
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn subscription_id_display() {
        let id = SubscriptionId::new(42);
        assert_eq!(id.to_string(), "Sub(42)");
    }

    #[test]
    fn registry_new_is_empty() {
        let registry = CallbackRegistry::new();
        assert!(registry.is_empty());
    }

    #[test]
    fn dispatch_and_unsubscribe() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let id = registry.subscribe(move |_snapshot| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(registry.len(), 1);

        registry.dispatch(&DeviceSnapshot::new());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));

        registry.dispatch(&DeviceSnapshot::new());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn multiple_subscribers_all_receive() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        for _ in 0..3 {
            let c = counter.clone();
            registry.subscribe(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }

        registry.dispatch(&DeviceSnapshot::new());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn weak_subscriber_is_pruned_after_drop() {
        let registry = CallbackRegistry::new();
        let target = Arc::new(AtomicU32::new(0));

        registry.subscribe_weak(&target, |t, _| {
            t.fetch_add(1, Ordering::SeqCst);
        });
        registry.dispatch(&DeviceSnapshot::new());
        assert_eq!(target.load(Ordering::SeqCst), 1);

        drop(target);
        registry.dispatch(&DeviceSnapshot::new());
        assert!(registry.is_empty());
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let registry = Arc::new(CallbackRegistry::new());
        let slot = Arc::new(parking_lot::Mutex::new(None::<SubscriptionId>));
        let weak_registry = Arc::downgrade(&registry);
        let slot_clone = slot.clone();

        let id = registry.subscribe(move |_| {
            if let (Some(reg), Some(id)) = (weak_registry.upgrade(), *slot_clone.lock()) {
                reg.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        registry.dispatch(&DeviceSnapshot::new());
        assert!(registry.is_empty());
    }

    #[test]
    fn unique_ids() {
        let registry = CallbackRegistry::new();
        let id1 = registry.subscribe(|_| {});
        let id2 = registry.subscribe(|_| {});
        assert_ne!(id1, id2);
    }

    #[test]
    fn registry_debug() {
        let registry = CallbackRegistry::new();
        registry.subscribe(|_| {});
        let debug = format!("{registry:?}");
        assert!(debug.contains("callback_count"));
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level handle for one processor.
//!
//! A [`Device`] bundles the [`Coordinator`] that keeps the snapshot fresh
//! and the [`CommandDispatcher`] that sends commands through it.
//!
//! ```no_run
//! use novastar_lib::Device;
//!
//! # async fn example() -> novastar_lib::Result<()> {
//! let (device, _) = Device::builder("192.168.21.99")
//!     .with_credentials("NDdi", "MmZjZWVm")
//!     .build()
//!     .await?;
//!
//! device.set_brightness(55).await?;
//! assert_eq!(device.snapshot().brightness().value(), 55);
//!
//! device.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod builder;

pub use builder::DeviceBuilder;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;

use crate::coordinator::{Coordinator, CoordinatorState};
use crate::dispatcher::CommandDispatcher;
use crate::error::Result;
use crate::protocol::{ConnectionParams, Method};
use crate::response::DeviceInfo;
use crate::state::DeviceSnapshot;
use crate::subscription::SubscriptionId;
use crate::types::PresetId;

/// A Novastar H series processor.
///
/// Cloning is cheap and every clone controls the same session.
#[derive(Debug, Clone)]
pub struct Device {
    coordinator: Coordinator,
    dispatcher: CommandDispatcher,
}

impl Device {
    /// Starts building a device at the given host.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> DeviceBuilder {
        DeviceBuilder::new(ConnectionParams::new(host))
    }

    /// Starts building a device from complete connection parameters.
    #[must_use]
    pub fn from_params(params: ConnectionParams) -> DeviceBuilder {
        DeviceBuilder::new(params)
    }

    pub(crate) fn new(coordinator: Coordinator) -> Self {
        let dispatcher = CommandDispatcher::new(coordinator.clone());
        Self {
            coordinator,
            dispatcher,
        }
    }

    /// Returns the configured display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.coordinator.client().session().params().name()
    }

    /// Returns the underlying coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    // ========== State ==========

    /// Returns the cached snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<DeviceSnapshot> {
        self.coordinator.snapshot()
    }

    /// Returns the coordinator's lifecycle state.
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        self.coordinator.state()
    }

    /// Returns a receiver for lifecycle transitions.
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<CoordinatorState> {
        self.coordinator.state_changes()
    }

    /// Polls now, or joins the poll in flight.
    ///
    /// # Errors
    ///
    /// See [`Coordinator::refresh`].
    pub async fn refresh(&self) -> Result<Arc<DeviceSnapshot>> {
        self.coordinator.refresh().await
    }

    /// Registers a callback for changed snapshots.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DeviceSnapshot) + Send + Sync + 'static,
    {
        self.coordinator.subscribe(callback)
    }

    /// Removes a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.coordinator.unsubscribe(id)
    }

    // ========== Commands ==========

    /// Switches the processor on or off.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::set_power`].
    pub async fn set_power(&self, on: bool) -> Result<()> {
        self.dispatcher.set_power(on).await
    }

    /// Switches the processor on.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::set_power`].
    pub async fn power_on(&self) -> Result<()> {
        self.set_power(true).await
    }

    /// Switches the processor off.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::set_power`].
    pub async fn power_off(&self) -> Result<()> {
        self.set_power(false).await
    }

    /// Sets the screen brightness in percent.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::set_brightness`].
    pub async fn set_brightness(&self, value: i64) -> Result<()> {
        self.dispatcher.set_brightness(value).await
    }

    /// Loads a known preset.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::set_preset_by_id`].
    pub async fn set_preset_by_id(&self, id: impl Into<PresetId>) -> Result<()> {
        self.dispatcher.set_preset_by_id(id).await
    }

    /// Shows content or fades to black.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::set_output`].
    pub async fn set_output(&self, on: bool) -> Result<()> {
        self.dispatcher.set_output(on).await
    }

    /// Shows content or fades to black over `transition`.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::set_output_with_transition`].
    pub async fn set_output_with_transition(&self, on: bool, transition: Duration) -> Result<()> {
        self.dispatcher
            .set_output_with_transition(on, transition)
            .await
    }

    /// Freezes or unfreezes the displayed frame.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::set_freeze`].
    pub async fn set_freeze(&self, enable: bool) -> Result<()> {
        self.dispatcher.set_freeze(enable).await
    }

    // ========== Direct access ==========

    /// Reads device information without touching the snapshot.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::check_connection`](crate::protocol::ApiClient::check_connection).
    pub async fn check_connection(&self) -> Result<DeviceInfo> {
        self.coordinator.client().check_connection().await
    }

    /// Sends a request to an arbitrary endpoint. No refresh follows.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send_raw`](crate::protocol::ApiClient::send_raw).
    pub async fn send_raw(&self, method: Method, path: &str, payload: &Value) -> Result<Option<Value>> {
        self.coordinator.client().send_raw(method, path, payload).await
    }

    /// Stops polling and cancels any request in flight.
    pub async fn shutdown(&self) {
        self.coordinator.shutdown().await;
    }
}

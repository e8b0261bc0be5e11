// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device builder.

use std::sync::Arc;
use std::time::Duration;

use crate::coordinator::{Coordinator, CoordinatorConfig};
use crate::device::Device;
use crate::error::Result;
use crate::protocol::{ApiClient, ConnectionParams, RequestSigner};
use crate::state::DeviceSnapshot;

/// Builder for [`Device`].
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use novastar_lib::Device;
///
/// # async fn example() -> novastar_lib::Result<()> {
/// // Wait for the first poll
/// let (device, snapshot) = Device::builder("192.168.21.99")
///     .with_credentials("NDdi", "MmZjZWVm")
///     .with_encryption(true)
///     .build()
///     .await?;
/// println!("brightness: {}", snapshot.brightness());
///
/// // Start polling in the background and return at once
/// let device = Device::builder("192.168.21.100")
///     .with_poll_interval(Duration::from_secs(5))
///     .build_deferred()?;
/// # Ok(())
/// # }
/// ```
pub struct DeviceBuilder {
    params: ConnectionParams,
    config: CoordinatorConfig,
    signer: Option<Arc<dyn RequestSigner>>,
}

impl DeviceBuilder {
    pub(crate) fn new(params: ConnectionParams) -> Self {
        Self {
            params,
            config: CoordinatorConfig::default(),
            signer: None,
        }
    }

    /// Sets the HTTP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.params = self.params.with_port(port);
        self
    }

    /// Uses HTTPS.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.params = self.params.with_https();
        self
    }

    /// Sets the project ID and secret key.
    #[must_use]
    pub fn with_credentials(
        mut self,
        project_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.params = self
            .params
            .with_project_id(project_id)
            .with_secret_key(secret_key);
        self
    }

    /// Enables or disables payload encryption.
    #[must_use]
    pub fn with_encryption(mut self, enabled: bool) -> Self {
        self.params = self.params.with_encryption(enabled);
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.params = self.params.with_name(name);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.params = self.params.with_timeout(timeout);
        self
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config = self.config.with_poll_interval(interval);
        self
    }

    /// Replaces the whole coordinator configuration.
    #[must_use]
    pub fn with_coordinator_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses a custom request signer instead of the vendor MD5 scheme.
    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Returns the connection parameters configured so far.
    #[must_use]
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Builds the device, waits for the first poll, then starts polling.
    ///
    /// Returns the device and the snapshot produced by the first poll.
    ///
    /// # Errors
    ///
    /// Returns a configuration error before any request is sent, or the
    /// error of the first poll. No background task is left running on
    /// error.
    pub async fn build(self) -> Result<(Device, DeviceSnapshot)> {
        let coordinator = self.coordinator()?;
        let snapshot = match coordinator.refresh().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                coordinator.shutdown().await;
                return Err(err);
            }
        };
        coordinator.start();
        Ok((Device::new(coordinator), (*snapshot).clone()))
    }

    /// Builds the device and starts polling without waiting.
    ///
    /// The first poll runs in the background; until it completes the
    /// snapshot is empty and unavailable. Must be called within a Tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, such as a secret key too short for
    /// encryption.
    pub fn build_deferred(self) -> Result<Device> {
        let coordinator = self.coordinator()?;
        coordinator.start();
        Ok(Device::new(coordinator))
    }

    fn coordinator(self) -> Result<Coordinator> {
        let client = match self.signer {
            Some(signer) => ApiClient::with_signer(self.params, signer)?,
            None => ApiClient::new(self.params)?,
        };
        Ok(Coordinator::new(client, self.config))
    }
}

impl std::fmt::Debug for DeviceBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuilder")
            .field("params", &self.params)
            .field("config", &self.config)
            .field("custom_signer", &self.signer.is_some())
            .finish()
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Confirmation of discovered processors.
//!
//! Finding candidate hosts (SSDP, Zeroconf, a manual address) happens
//! outside this crate. [`probe`] takes one `{host, port}` candidate, checks
//! that a processor answers there, and returns what it reports about
//! itself. The result seeds [`ConnectionParams::from_discovery`].
//!
//! # Examples
//!
//! ```no_run
//! use novastar_lib::discovery::probe;
//! use novastar_lib::protocol::ConnectionParams;
//!
//! # async fn example() -> novastar_lib::Result<()> {
//! let found = probe("192.168.21.99", 8000).await?;
//! println!("found {} ({:?})", found.display_name(), found.serial);
//!
//! let params = ConnectionParams::from_discovery(&found)
//!     .with_project_id("NDdi")
//!     .with_secret_key("MmZjZWVm");
//! # Ok(())
//! # }
//! ```
//!
//! [`ConnectionParams::from_discovery`]: crate::protocol::ConnectionParams::from_discovery

use std::time::Duration;

use crate::error::Result;
use crate::protocol::{ApiClient, ConnectionParams};

/// Timeout for a single probe request.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// A processor that answered a probe, or a candidate handed in by a
/// discovery transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    /// Host name or IP address.
    pub host: String,
    /// HTTP port.
    pub port: u16,
    /// Device name, if reported.
    pub name: Option<String>,
    /// Model name, if reported.
    pub model: Option<String>,
    /// Serial number, if reported.
    pub serial: Option<String>,
}

impl DiscoveredDevice {
    /// Creates a candidate with only an address.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            name: None,
            model: None,
            serial: None,
        }
    }

    /// Returns the device name, falling back to the model.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.name, &self.model) {
            (Some(name), _) if !name.is_empty() => name.clone(),
            (_, Some(model)) if !model.is_empty() => format!("Novastar {model}"),
            _ => ConnectionParams::DEFAULT_NAME.to_string(),
        }
    }
}

/// Checks that a processor answers at `host:port`.
///
/// Sends one unauthenticated device-info read with a short timeout.
///
/// # Errors
///
/// Returns `ConnectionRefused` or `Timeout` if nothing answers, and
/// `MalformedResponse` if something answers that is not a processor.
pub async fn probe(host: impl Into<String>, port: u16) -> Result<DiscoveredDevice> {
    let host = host.into();
    let client = ApiClient::new(
        ConnectionParams::new(host.clone())
            .with_port(port)
            .with_timeout(PROBE_TIMEOUT),
    )?;

    tracing::debug!(host = %host, port, "Probing for processor");
    let info = client.get_device_info().await?;
    tracing::info!(host = %host, port, model = %info.model, "Processor found");

    Ok(DiscoveredDevice {
        host,
        port,
        name: info.name.filter(|n| !n.is_empty()),
        model: Some(info.model).filter(|m| !m.is_empty()),
        serial: info.serial.filter(|s| !s.is_empty()),
    })
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `GET /api/device` response parsing.

use serde::{Deserialize, Deserializer};

use super::status::optional_flag;

/// Static device metadata.
///
/// `model` and `firmware` are required. The remaining fields are reported by
/// some firmware releases only.
///
/// # Examples
///
/// ```
/// use novastar_lib::response::DeviceInfo;
///
/// let json = r#"{"model": "H2", "firmware": "1.4.0", "sn": "NS123", "temp": 0, "status": 1}"#;
/// let info: DeviceInfo = serde_json::from_str(json).unwrap();
/// assert_eq!(info.model, "H2");
/// assert_eq!(info.serial.as_deref(), Some("NS123"));
/// assert_eq!(info.ready, Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceInfo {
    /// Model name.
    pub model: String,

    /// Firmware version string.
    #[serde(alias = "protoVersion")]
    pub firmware: String,

    /// Device name configured on the processor.
    #[serde(default)]
    pub name: Option<String>,

    /// Serial number.
    #[serde(default, alias = "sn")]
    pub serial: Option<String>,

    /// MAC address.
    #[serde(default, alias = "MAC")]
    pub mac: Option<String>,

    /// Temperature status code (`0` is normal).
    #[serde(default, alias = "temp")]
    pub temperature_status: Option<i64>,

    /// Whether the processor is ready (`true`) or busy (`false`).
    #[serde(default, alias = "status", deserialize_with = "optional_flag")]
    pub ready: Option<bool>,

    /// Input signal status of the first power entry (`0` means no signal).
    #[serde(default, rename = "powerList", deserialize_with = "first_signal")]
    pub signal_status: Option<i64>,
}

impl DeviceInfo {
    /// Returns `true` when the device reports an abnormal temperature.
    #[must_use]
    pub fn temperature_warning(&self) -> bool {
        self.temperature_status.is_some_and(|code| code != 0)
    }

    /// Returns whether an input signal is present, if the device reports it.
    #[must_use]
    pub fn has_signal(&self) -> Option<bool> {
        self.signal_status.map(|code| code != 0)
    }
}

/// Reads `iSignal` from the first entry of `powerList`.
fn first_signal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    struct PowerEntry {
        #[serde(default, rename = "iSignal")]
        signal: Option<i64>,
    }

    let entries = Option::<Vec<PowerEntry>>::deserialize(deserializer)?;
    Ok(entries
        .and_then(|list| list.into_iter().next())
        .and_then(|entry| entry.signal))
}

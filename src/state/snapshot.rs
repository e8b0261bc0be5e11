// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device snapshot.

use chrono::{DateTime, Utc};

use crate::response::{DeviceInfo, StatusResponse};
use crate::types::{Brightness, OutputState, PowerState, Preset, PresetId};

/// Last known state of one processor.
///
/// A snapshot is never mutated after it has been published. The coordinator
/// builds a new value from each poll outcome and swaps it in whole, so a
/// reader always sees fields that belong together.
///
/// When a poll fails, every field except `available` keeps its previous
/// value.
///
/// # Examples
///
/// ```
/// use novastar_lib::state::DeviceSnapshot;
/// use novastar_lib::types::PowerState;
///
/// let snapshot = DeviceSnapshot::new();
/// assert_eq!(snapshot.power(), PowerState::Unknown);
/// assert!(!snapshot.is_available());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSnapshot {
    power: PowerState,
    output: OutputState,
    brightness: Brightness,
    active_preset: Option<Preset>,
    presets: Vec<Preset>,
    device_info: Option<DeviceInfo>,
    freeze: Option<bool>,
    last_updated: Option<DateTime<Utc>>,
    available: bool,
}

impl DeviceSnapshot {
    /// Creates an empty snapshot for a device that has not been polled yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Accessors ==========

    /// Power state.
    #[must_use]
    pub fn power(&self) -> PowerState {
        self.power
    }

    /// Output state (`Blanked` while fade-to-black is active).
    #[must_use]
    pub fn output(&self) -> OutputState {
        self.output
    }

    /// Screen brightness, always within 0-100.
    #[must_use]
    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Active preset, when the device reports one.
    ///
    /// The label falls back to `"Preset {id}"` if the id is not in the
    /// known preset list.
    #[must_use]
    pub fn active_preset(&self) -> Option<&Preset> {
        self.active_preset.as_ref()
    }

    /// Presets stored on the device, in device order.
    #[must_use]
    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    /// Looks up a known preset by id.
    #[must_use]
    pub fn preset(&self, id: PresetId) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id() == id)
    }

    /// Model and firmware information.
    #[must_use]
    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.device_info.as_ref()
    }

    /// Freeze flag, if the firmware reports it.
    #[must_use]
    pub fn freeze(&self) -> Option<bool> {
        self.freeze
    }

    /// Time of the last successful poll.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Returns `true` if the most recent poll succeeded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }

    // ========== Derivation ==========

    /// Builds the snapshot that follows a successful poll.
    ///
    /// `device_info` and `presets` are `None` when the poll skipped the slow
    /// reads; the previous values are carried over in that case.
    #[must_use]
    pub fn updated(
        &self,
        status: &StatusResponse,
        device_info: Option<DeviceInfo>,
        presets: Option<Vec<Preset>>,
        at: DateTime<Utc>,
    ) -> Self {
        let presets = presets.unwrap_or_else(|| self.presets.clone());
        let active_preset = status.preset_id().map(|id| {
            presets
                .iter()
                .find(|p| p.id() == id)
                .cloned()
                .unwrap_or_else(|| Preset::new(id, format!("Preset {id}")))
        });

        Self {
            power: status.power(),
            output: status.output(),
            brightness: status.brightness(),
            active_preset,
            presets,
            device_info: device_info.or_else(|| self.device_info.clone()),
            freeze: status.freeze().or(self.freeze),
            last_updated: Some(at),
            available: true,
        }
    }

    /// Builds the snapshot that follows a failed poll.
    #[must_use]
    pub fn unavailable(&self) -> Self {
        Self {
            available: false,
            ..self.clone()
        }
    }

    /// Compares everything except the update timestamp.
    ///
    /// Two polls that read identical values are the same state even though
    /// they happened at different times.
    #[must_use]
    pub fn same_state(&self, other: &Self) -> bool {
        self.power == other.power
            && self.output == other.output
            && self.brightness == other.brightness
            && self.active_preset == other.active_preset
            && self.presets == other.presets
            && self.device_info == other.device_info
            && self.freeze == other.freeze
            && self.available == other.available
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command dispatch.
//!
//! [`CommandDispatcher`] validates a caller's intent, sends the matching
//! write through the [`ApiClient`](crate::protocol::ApiClient), and then asks
//! the coordinator for a refresh so the snapshot reflects the command.
//!
//! | Method | Validation | Request |
//! |--------|------------|---------|
//! | [`set_power`](CommandDispatcher::set_power) | none | `POST /api/power` |
//! | [`set_brightness`](CommandDispatcher::set_brightness) | 0-100 | `POST /api/brightness` |
//! | [`set_preset_by_id`](CommandDispatcher::set_preset_by_id) | known preset | `POST /api/preset` |
//! | [`set_output`](CommandDispatcher::set_output) | none | `POST /api/output` |
//! | [`set_freeze`](CommandDispatcher::set_freeze) | none | `POST /api/freeze` |

use std::time::Duration;

use crate::coordinator::Coordinator;
use crate::error::{Error, Result, ValueError};
use crate::types::{Brightness, PresetId};

/// Translates commands into API calls followed by a refresh.
///
/// A command succeeds once the device acknowledges it. The follow-up refresh
/// is best effort: its failure is not reported to the caller but shows up in
/// the snapshot's availability. A failed command leaves the snapshot as it
/// was.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    coordinator: Coordinator,
}

impl CommandDispatcher {
    /// Creates a dispatcher bound to a coordinator.
    #[must_use]
    pub fn new(coordinator: Coordinator) -> Self {
        Self { coordinator }
    }

    /// Returns the coordinator this dispatcher refreshes.
    #[must_use]
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Switches the processor on or off.
    ///
    /// # Errors
    ///
    /// Returns the client's error if the device does not accept the command,
    /// or [`Error::Stopped`] after shutdown.
    pub async fn set_power(&self, on: bool) -> Result<()> {
        self.ensure_running()?;
        self.coordinator.client().set_power(on).await?;
        self.refresh_after("power").await;
        Ok(())
    }

    /// Sets the screen brightness in percent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` without contacting the device if `value` is
    /// outside 0-100, otherwise see [`set_power`](Self::set_power).
    pub async fn set_brightness(&self, value: i64) -> Result<()> {
        let brightness = Brightness::try_from(value)?;
        self.ensure_running()?;
        self.coordinator.client().set_brightness(brightness).await?;
        self.refresh_after("brightness").await;
        Ok(())
    }

    /// Loads one of the presets in the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` without contacting the device if the id is
    /// not in the known preset list, otherwise see
    /// [`set_power`](Self::set_power).
    pub async fn set_preset_by_id(&self, id: impl Into<PresetId>) -> Result<()> {
        let id = id.into();
        if self.coordinator.snapshot().preset(id).is_none() {
            return Err(ValueError::UnknownPreset(id.value()).into());
        }
        self.ensure_running()?;
        self.coordinator.client().set_preset(id).await?;
        self.refresh_after("preset").await;
        Ok(())
    }

    /// Shows content (`true`) or fades to black (`false`).
    ///
    /// # Errors
    ///
    /// See [`set_power`](Self::set_power).
    pub async fn set_output(&self, on: bool) -> Result<()> {
        self.ensure_running()?;
        self.coordinator.client().set_output(on).await?;
        self.refresh_after("output").await;
        Ok(())
    }

    /// Like [`set_output`](Self::set_output) with a fade duration.
    ///
    /// # Errors
    ///
    /// See [`set_power`](Self::set_power).
    pub async fn set_output_with_transition(&self, on: bool, transition: Duration) -> Result<()> {
        self.ensure_running()?;
        self.coordinator
            .client()
            .set_output_with_transition(on, transition)
            .await?;
        self.refresh_after("output").await;
        Ok(())
    }

    /// Freezes or unfreezes the displayed frame.
    ///
    /// # Errors
    ///
    /// See [`set_power`](Self::set_power).
    pub async fn set_freeze(&self, enable: bool) -> Result<()> {
        self.ensure_running()?;
        self.coordinator.client().set_freeze(enable).await?;
        self.refresh_after("freeze").await;
        Ok(())
    }

    fn ensure_running(&self) -> Result<()> {
        if self.coordinator.state().is_stopped() {
            return Err(Error::Stopped);
        }
        Ok(())
    }

    async fn refresh_after(&self, command: &'static str) {
        if let Err(err) = self.coordinator.refresh().await {
            tracing::debug!(command, error = %err, "Refresh after command failed");
        }
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness and preset commands.

use serde_json::{Value, json};

use crate::command::Command;
use crate::protocol::Endpoint;
use crate::types::{Brightness, PresetId};

/// Command to set screen brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessCommand(Brightness);

impl BrightnessCommand {
    /// Creates a brightness command.
    #[must_use]
    pub const fn new(value: Brightness) -> Self {
        Self(value)
    }
}

impl Command for BrightnessCommand {
    fn endpoint(&self) -> Endpoint {
        Endpoint::Brightness
    }

    fn payload(&self) -> Value {
        json!({ "value": self.0.value() })
    }
}

/// Command to load a preset.
///
/// # Examples
///
/// ```
/// use novastar_lib::command::{Command, PresetCommand};
/// use novastar_lib::types::PresetId;
///
/// let cmd = PresetCommand::new(PresetId::new(3));
/// assert_eq!(cmd.payload(), serde_json::json!({"id": 3}));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetCommand(PresetId);

impl PresetCommand {
    /// Creates a preset command.
    #[must_use]
    pub const fn new(id: PresetId) -> Self {
        Self(id)
    }

    /// Returns the preset id.
    #[must_use]
    pub const fn id(&self) -> PresetId {
        self.0
    }
}

impl Command for PresetCommand {
    fn endpoint(&self) -> Endpoint {
        Endpoint::Preset
    }

    fn payload(&self) -> Value {
        json!({ "id": self.0.value() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_payload() {
        let cmd = BrightnessCommand::new(Brightness::MAX);
        assert_eq!(cmd.payload(), json!({"value": 100}));
    }

    #[test]
    fn preset_payload() {
        let cmd = PresetCommand::new(PresetId::new(12));
        assert_eq!(cmd.endpoint(), Endpoint::Preset);
        assert_eq!(cmd.id(), PresetId::new(12));
        assert_eq!(cmd.payload(), json!({"id": 12}));
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `GET /api/status` response parsing.

use serde::{Deserialize, Deserializer};

use crate::types::{Brightness, OutputState, PowerState, PresetId};

/// Live status of the processor.
///
/// Every field except `freeze` is required; a body missing any of them is
/// rejected instead of being filled with defaults.
///
/// # Examples
///
/// ```
/// use novastar_lib::response::StatusResponse;
/// use novastar_lib::types::PowerState;
///
/// let json = r#"{"power": true, "output": 1, "brightness": 30, "presetId": 2}"#;
/// let status: StatusResponse = serde_json::from_str(json).unwrap();
/// assert_eq!(status.power(), PowerState::On);
/// assert_eq!(status.brightness().value(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(deserialize_with = "flag")]
    power: bool,
    #[serde(deserialize_with = "flag")]
    output: bool,
    brightness: Brightness,
    #[serde(deserialize_with = "active_preset")]
    preset_id: Option<PresetId>,
    #[serde(default, deserialize_with = "optional_flag")]
    freeze: Option<bool>,
}

impl StatusResponse {
    /// Returns the power state.
    #[must_use]
    pub fn power(&self) -> PowerState {
        PowerState::from(self.power)
    }

    /// Returns the output (fade-to-black) state.
    #[must_use]
    pub fn output(&self) -> OutputState {
        OutputState::from(self.output)
    }

    /// Returns the screen brightness.
    #[must_use]
    pub fn brightness(&self) -> Brightness {
        self.brightness
    }

    /// Returns the active preset, or `None` if no preset is playing.
    #[must_use]
    pub fn preset_id(&self) -> Option<PresetId> {
        self.preset_id
    }

    /// Returns the freeze state, if the firmware reports it.
    #[must_use]
    pub fn freeze(&self) -> Option<bool> {
        self.freeze
    }
}

/// Accepts `true`/`false` or `1`/`0`.
pub(crate) fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "expected 0 or 1, got {other}"
        ))),
    }
}

pub(crate) fn optional_flag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<bool>, D::Error> {
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "flag")] bool);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(b)| b))
}

/// The key is required; `null` or a negative id means no preset is active.
fn active_preset<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<PresetId>, D::Error> {
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.filter(|id| *id >= 0).map(PresetId::new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    fn parse(json: &str) -> Result<StatusResponse, ParseError> {
        serde_json::from_str(json).map_err(ParseError::from)
    }

    #[test]
    fn full_status() {
        let status =
            parse(r#"{"power": false, "output": false, "brightness": 0, "presetId": 7, "freeze": true}"#)
                .unwrap();
        assert_eq!(status.power(), PowerState::Off);
        assert_eq!(status.output(), OutputState::Blanked);
        assert_eq!(status.brightness(), Brightness::MIN);
        assert_eq!(status.preset_id(), Some(PresetId::new(7)));
        assert_eq!(status.freeze(), Some(true));
    }

    #[test]
    fn no_active_preset() {
        let none = parse(r#"{"power": 1, "output": 1, "brightness": 50, "presetId": -1}"#).unwrap();
        assert_eq!(none.preset_id(), None);
        let null = parse(r#"{"power": 1, "output": 1, "brightness": 50, "presetId": null}"#).unwrap();
        assert_eq!(null.preset_id(), None);
        assert_eq!(null.freeze(), None);
    }

    #[test]
    fn missing_power_is_rejected() {
        let err = parse(r#"{"output": true, "brightness": 50, "presetId": 1}"#).unwrap_err();
        assert_eq!(err, ParseError::MissingField("power".to_string()));
    }

    #[test]
    fn missing_preset_key_is_rejected() {
        let err = parse(r#"{"power": true, "output": true, "brightness": 50}"#).unwrap_err();
        assert_eq!(err, ParseError::MissingField("presetId".to_string()));
    }

    #[test]
    fn out_of_range_brightness_is_rejected() {
        assert!(parse(r#"{"power": true, "output": true, "brightness": 140, "presetId": 1}"#).is_err());
    }

    #[test]
    fn invalid_flag_is_rejected() {
        assert!(parse(r#"{"power": 2, "output": true, "brightness": 10, "presetId": 1}"#).is_err());
        assert!(parse(r#"{"power": "on", "output": true, "brightness": 10, "presetId": 1}"#).is_err());
    }
}

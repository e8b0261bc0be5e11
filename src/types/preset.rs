// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Preset identifiers and descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Device-assigned preset identifier.
///
/// The value is opaque to this library; it is only compared and echoed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetId(i64);

impl PresetId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PresetId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A preset stored on the processor.
///
/// # Examples
///
/// ```
/// use novastar_lib::types::{Preset, PresetId};
///
/// let preset = Preset::new(PresetId::new(2), "Main show");
/// assert_eq!(preset.id().value(), 2);
/// assert_eq!(preset.label(), "Main show");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Preset {
    id: PresetId,
    #[serde(alias = "name")]
    label: String,
}

impl Preset {
    /// Creates a preset descriptor.
    #[must_use]
    pub fn new(id: PresetId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    /// Returns the preset identifier.
    #[must_use]
    pub const fn id(&self) -> PresetId {
        self.id
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_accepts_name_alias() {
        let preset: Preset = serde_json::from_str(r#"{"id": 4, "name": "Intro"}"#).unwrap();
        assert_eq!(preset, Preset::new(PresetId::new(4), "Intro"));
    }

    #[test]
    fn preset_requires_label() {
        assert!(serde_json::from_str::<Preset>(r#"{"id": 4}"#).is_err());
    }

    #[test]
    fn preset_display() {
        let preset = Preset::new(PresetId::new(1), "Walk-in");
        assert_eq!(preset.to_string(), "Walk-in (1)");
    }
}

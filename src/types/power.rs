// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power and output (fade-to-black) states.

use std::fmt;

/// Power state of the processor.
///
/// `Unknown` is only observed before the first successful status read.
///
/// # Examples
///
/// ```
/// use novastar_lib::types::PowerState;
///
/// assert_eq!(PowerState::from(true), PowerState::On);
/// assert_eq!(PowerState::default(), PowerState::Unknown);
/// assert_eq!(PowerState::On.as_bool(), Some(true));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PowerState {
    /// Power is off.
    Off,
    /// Power is on.
    On,
    /// No status has been read yet.
    #[default]
    Unknown,
}

impl PowerState {
    /// Returns the state as a boolean, or `None` when unknown.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Off => Some(false),
            Self::On => Some(true),
            Self::Unknown => None,
        }
    }

    /// Returns a lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// Output state of the screen.
///
/// `Visible` means fade-to-black is inactive; `Blanked` means the screen
/// has been faded to black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputState {
    /// Content is shown.
    #[default]
    Visible,
    /// Fade-to-black is active.
    Blanked,
}

impl OutputState {
    /// Returns `true` when content is shown.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        matches!(self, Self::Visible)
    }
}

impl From<bool> for OutputState {
    fn from(on: bool) -> Self {
        if on { Self::Visible } else { Self::Blanked }
    }
}

impl fmt::Display for OutputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Visible => "visible",
            Self::Blanked => "blanked",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_state_from_bool() {
        assert_eq!(PowerState::from(true), PowerState::On);
        assert_eq!(PowerState::from(false), PowerState::Off);
    }

    #[test]
    fn power_state_as_bool() {
        assert_eq!(PowerState::Off.as_bool(), Some(false));
        assert_eq!(PowerState::Unknown.as_bool(), None);
    }

    #[test]
    fn output_state_maps_ftb() {
        assert!(OutputState::from(true).is_visible());
        assert_eq!(OutputState::from(false), OutputState::Blanked);
        assert_eq!(OutputState::Blanked.to_string(), "blanked");
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Screen brightness type.
//!
//! The processor reports and accepts brightness as a percentage. The
//! [`Brightness`] newtype guarantees the value stays within 0-100.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValueError;

/// Screen brightness as a percentage (0-100).
///
/// # Examples
///
/// ```
/// use novastar_lib::types::Brightness;
///
/// let level = Brightness::new(55).unwrap();
/// assert_eq!(level.value(), 55);
///
/// assert!(Brightness::new(101).is_err());
/// assert!(Brightness::try_from(-1_i64).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Brightness(u8);

impl Brightness {
    /// Minimum brightness (0%).
    pub const MIN: Self = Self(0);

    /// Maximum brightness (100%).
    pub const MAX: Self = Self(100);

    /// Creates a new brightness value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: 100,
                actual: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a brightness value, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Returns the brightness percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Brightness {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Brightness {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let out_of_range = ValueError::OutOfRange {
            min: 0,
            max: 100,
            actual: value,
        };
        let narrow = u8::try_from(value).map_err(|_| out_of_range.clone())?;
        Self::new(narrow).map_err(|_| out_of_range)
    }
}

impl<'de> Deserialize<'de> for Brightness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_valid_values() {
        for v in 0..=100 {
            assert_eq!(Brightness::new(v).unwrap().value(), v);
        }
    }

    #[test]
    fn brightness_rejects_out_of_range() {
        assert!(Brightness::new(101).is_err());
        for v in [-1_i64, -100, 101, 255, 256, i64::MAX, i64::MIN] {
            let err = Brightness::try_from(v).unwrap_err();
            assert_eq!(
                err,
                ValueError::OutOfRange {
                    min: 0,
                    max: 100,
                    actual: v
                }
            );
        }
    }

    #[test]
    fn brightness_clamped() {
        assert_eq!(Brightness::clamped(50).value(), 50);
        assert_eq!(Brightness::clamped(200).value(), 100);
    }

    #[test]
    fn brightness_deserialize_validates() {
        let ok: Brightness = serde_json::from_str("42").unwrap();
        assert_eq!(ok.value(), 42);
        assert!(serde_json::from_str::<Brightness>("120").is_err());
        assert!(serde_json::from_str::<Brightness>("-3").is_err());
    }

    #[test]
    fn brightness_display() {
        assert_eq!(Brightness::new(75).unwrap().to_string(), "75%");
    }
}

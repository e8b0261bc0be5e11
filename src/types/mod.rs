// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for processor control.
//!
//! Each type checks its range at construction time, so a value that made it
//! into a command is always one the device accepts.
//!
//! # Types
//!
//! - [`PowerState`] - On/Off/Unknown
//! - [`OutputState`] - Visible or blanked (fade-to-black)
//! - [`Brightness`] - Screen brightness (0-100%)
//! - [`PresetId`] / [`Preset`] - Stored presets

mod brightness;
mod power;
mod preset;

pub use brightness::Brightness;
pub use power::{OutputState, PowerState};
pub use preset::{Preset, PresetId};

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response parsing for processor JSON responses.
//!
//! Every response arrives in an [`Envelope`]; its decoded body is then
//! validated against one of the typed schemas below. A body that misses a
//! required field is an error, never a partially filled value.

mod device_info;
mod envelope;
mod presets;
mod status;

pub use device_info::DeviceInfo;
pub use envelope::{AUTH_STATUSES, Envelope, STATUS_NOT_FOUND, STATUS_OK};
pub use presets::PresetList;
pub use status::StatusResponse;

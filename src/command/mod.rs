// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Write command definitions.
//!
//! | Command Type | Endpoint | Payload |
//! |-------------|----------|---------|
//! | [`PowerCommand`] | `POST /api/power` | `{"on": bool}` |
//! | [`OutputCommand`] | `POST /api/output` | `{"on": bool, "time": secs}` |
//! | [`FreezeCommand`] | `POST /api/freeze` | `{"enable": bool}` |
//! | [`BrightnessCommand`] | `POST /api/brightness` | `{"value": 0-100}` |
//! | [`PresetCommand`] | `POST /api/preset` | `{"id": id}` |
//!
//! # Examples
//!
//! ```
//! use novastar_lib::command::{BrightnessCommand, Command};
//! use novastar_lib::protocol::Endpoint;
//! use novastar_lib::types::Brightness;
//!
//! let cmd = BrightnessCommand::new(Brightness::new(55).unwrap());
//! assert_eq!(cmd.endpoint(), Endpoint::Brightness);
//! assert_eq!(cmd.payload(), serde_json::json!({"value": 55}));
//! ```

mod power;
mod screen;

pub use power::{FreezeCommand, OutputCommand, PowerCommand};
pub use screen::{BrightnessCommand, PresetCommand};

use serde_json::Value;

use crate::protocol::Endpoint;

/// A write operation that can be sent to the processor.
pub trait Command {
    /// Returns the endpoint the command is posted to.
    fn endpoint(&self) -> Endpoint;

    /// Returns the JSON payload, before encryption.
    fn payload(&self) -> Value;
}

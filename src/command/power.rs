// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power, output and freeze commands.

use std::time::Duration;

use serde_json::{Value, json};

use crate::command::Command;
use crate::protocol::Endpoint;

/// Command to switch the processor on or off.
///
/// # Examples
///
/// ```
/// use novastar_lib::command::{Command, PowerCommand};
///
/// assert_eq!(PowerCommand::on().payload(), serde_json::json!({"on": true}));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerCommand {
    on: bool,
}

impl PowerCommand {
    /// Creates a power command.
    #[must_use]
    pub const fn new(on: bool) -> Self {
        Self { on }
    }

    /// Creates a command to turn the processor on.
    #[must_use]
    pub const fn on() -> Self {
        Self::new(true)
    }

    /// Creates a command to turn the processor off.
    #[must_use]
    pub const fn off() -> Self {
        Self::new(false)
    }
}

impl Command for PowerCommand {
    fn endpoint(&self) -> Endpoint {
        Endpoint::Power
    }

    fn payload(&self) -> Value {
        json!({ "on": self.on })
    }
}

/// Command to show content or fade the screen to black.
///
/// `on = false` activates fade-to-black. An optional transition time is
/// sent in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputCommand {
    on: bool,
    transition: Option<Duration>,
}

impl OutputCommand {
    /// Creates an output command with an immediate transition.
    #[must_use]
    pub const fn new(on: bool) -> Self {
        Self {
            on,
            transition: None,
        }
    }

    /// Sets the fade duration.
    #[must_use]
    pub const fn with_transition(mut self, transition: Duration) -> Self {
        self.transition = Some(transition);
        self
    }
}

impl Command for OutputCommand {
    fn endpoint(&self) -> Endpoint {
        Endpoint::Output
    }

    fn payload(&self) -> Value {
        match self.transition {
            Some(t) => json!({ "on": self.on, "time": t.as_secs() }),
            None => json!({ "on": self.on }),
        }
    }
}

/// Command to freeze or unfreeze the displayed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezeCommand {
    enable: bool,
}

impl FreezeCommand {
    /// Creates a freeze command.
    #[must_use]
    pub const fn new(enable: bool) -> Self {
        Self { enable }
    }
}

impl Command for FreezeCommand {
    fn endpoint(&self) -> Endpoint {
        Endpoint::Freeze
    }

    fn payload(&self) -> Value {
        json!({ "enable": self.enable })
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `novastar_lib` - A Rust library to control Novastar H series LED video
//! processors.
//!
//! The processors expose an HTTP API authenticated with a project ID and a
//! secret key, optionally with DES-encrypted payloads. This library keeps a
//! cached, consistent view of one processor by polling it in the background,
//! and sends commands that are reflected in that view as soon as the device
//! acknowledges them.
//!
//! # Supported Features
//!
//! - **Power control**: processor on/off
//! - **Screen control**: brightness, fade-to-black with transition, freeze
//! - **Presets**: list stored presets, load a preset
//! - **Status**: model, firmware, serial, temperature and ready flags
//! - **Synchronization**: interval polling, coalesced refreshes, backoff
//!   while unreachable, subscriber notifications on change
//!
//! # Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`protocol`] | signed HTTP requests, payload encryption, typed API client |
//! | [`coordinator`] | polling, single-flight refresh, lifecycle state |
//! | [`dispatcher`] | validated commands followed by a refresh |
//! | [`Device`] | one handle bundling both |
//!
//! # Quick Start
//!
//! ```no_run
//! use novastar_lib::Device;
//!
//! #[tokio::main]
//! async fn main() -> novastar_lib::Result<()> {
//!     // Returns (device, initial_snapshot) once the first poll succeeds
//!     let (device, snapshot) = Device::builder("192.168.21.99")
//!         .with_credentials("NDdi", "MmZjZWVm")
//!         .build()
//!         .await?;
//!
//!     println!("{} is {}", device.name(), snapshot.power());
//!
//!     device.subscribe(|snapshot| {
//!         println!("brightness is now {}", snapshot.brightness());
//!     });
//!
//!     device.set_brightness(55).await?;
//!     device.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Lifecycle
//!
//! ```no_run
//! use novastar_lib::{Device, coordinator::CoordinatorState};
//!
//! # async fn example() -> novastar_lib::Result<()> {
//! let device = Device::builder("192.168.21.99").build_deferred()?;
//! let mut states = device.state_changes();
//!
//! while states.changed().await.is_ok() {
//!     if let CoordinatorState::Stopped(reason) = &*states.borrow() {
//!         if reason.needs_reconfiguration() {
//!             eprintln!("credentials rejected: {reason}");
//!         }
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod coordinator;
mod device;
pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod response;
pub mod state;
pub mod subscription;
pub mod types;

pub use command::{
    BrightnessCommand, Command, FreezeCommand, OutputCommand, PowerCommand, PresetCommand,
};
pub use coordinator::{BackoffPolicy, Coordinator, CoordinatorConfig, CoordinatorState, StopReason};
pub use device::{Device, DeviceBuilder};
pub use discovery::{DiscoveredDevice, probe};
pub use dispatcher::CommandDispatcher;
pub use error::{
    CodecError, DeviceError, Error, ErrorKind, ParseError, ProtocolError, Result, ValueError,
};
pub use protocol::{ApiClient, ConnectionParams, Md5Signer, RequestSigner};
pub use response::{DeviceInfo, StatusResponse};
pub use state::DeviceSnapshot;
pub use subscription::{CallbackRegistry, SubscriptionId};
pub use types::{Brightness, OutputState, PowerState, Preset, PresetId};

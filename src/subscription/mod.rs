// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for snapshot updates.
//!
//! A subscriber is called with the full [`DeviceSnapshot`] each time a poll
//! changes it. Polls that read the same values do not notify.
//!
//! # Usage
//!
//! ```no_run
//! use novastar_lib::Device;
//!
//! # async fn example() -> novastar_lib::Result<()> {
//! let (device, _) = Device::builder("192.168.21.99").build().await?;
//!
//! let sub_id = device.subscribe(|snapshot| {
//!     println!("brightness is now {}", snapshot.brightness());
//! });
//!
//! // Later, unsubscribe
//! device.unsubscribe(sub_id);
//! # Ok(())
//! # }
//! ```
//!
//! [`DeviceSnapshot`]: crate::state::DeviceSnapshot

mod callback;

pub use callback::{CallbackRegistry, SubscriptionId};

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state.
//!
//! [`DeviceSnapshot`] is the cached view of one processor. The coordinator
//! derives a new snapshot from every poll and publishes it atomically;
//! readers hold an `Arc` to whichever snapshot was current when they asked.

mod snapshot;

pub use snapshot::DeviceSnapshot;

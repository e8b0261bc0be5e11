// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP protocol implementation for Novastar H series processors.
//!
//! # Layers
//!
//! - [`ConnectionParams`]: host, credentials and timeout for one device
//! - [`Session`]: codec and signer derived from the parameters
//! - [`TransportCodec`]: plain JSON or DES-encrypted payloads
//! - [`RequestSigner`]: pluggable request signature, [`Md5Signer`] by default
//! - [`ApiClient`]: one typed method per device operation

mod client;
mod codec;
mod session;
mod signer;

pub use client::ApiClient;
pub use codec::{KEY_LEN, TransportCodec};
pub use session::{ConnectionParams, Session};
pub use signer::{Md5Signer, RequestSigner, Signature, SigningInput};

use std::fmt;

/// HTTP method used by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read operation.
    Get,
    /// Write operation.
    Post,
}

/// Device API endpoints.
///
/// # Examples
///
/// ```
/// use novastar_lib::protocol::{Endpoint, Method};
///
/// assert_eq!(Endpoint::Status.path(), "/api/status");
/// assert_eq!(Endpoint::Brightness.method(), Method::Post);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Live status.
    Status,
    /// Device metadata.
    DeviceInfo,
    /// Stored presets.
    Presets,
    /// Power on/off.
    Power,
    /// Screen brightness.
    Brightness,
    /// Active preset.
    Preset,
    /// Output / fade-to-black.
    Output,
    /// Frame freeze.
    Freeze,
}

impl Endpoint {
    /// Returns the request path.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Status => "/api/status",
            Self::DeviceInfo => "/api/device",
            Self::Presets => "/api/presets",
            Self::Power => "/api/power",
            Self::Brightness => "/api/brightness",
            Self::Preset => "/api/preset",
            Self::Output => "/api/output",
            Self::Freeze => "/api/freeze",
        }
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        match self {
            Self::Status | Self::DeviceInfo | Self::Presets => Method::Get,
            Self::Power | Self::Brightness | Self::Preset | Self::Output | Self::Freeze => {
                Method::Post
            }
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection parameters and the per-client session derived from them.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::discovery::DiscoveredDevice;
use crate::error::{CodecError, ValueError};
use crate::protocol::codec::TransportCodec;
use crate::protocol::signer::{Md5Signer, RequestSigner, Signature, SigningInput};

// ============================================================================
// ConnectionParams
// ============================================================================

/// Parameters needed to open a session with one processor.
///
/// Immutable once handed to a client. The secret key is redacted from the
/// `Debug` output.
///
/// # Examples
///
/// ```
/// use novastar_lib::protocol::ConnectionParams;
/// use std::time::Duration;
///
/// let params = ConnectionParams::new("192.168.21.99")
///     .with_project_id("NDdi")
///     .with_secret_key("MmZjZWVm")
///     .with_encryption(true)
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(params.port(), 8000);
/// assert_eq!(params.base_url(), "http://192.168.21.99:8000");
/// ```
#[derive(Clone)]
pub struct ConnectionParams {
    host: String,
    port: u16,
    use_https: bool,
    project_id: String,
    secret_key: String,
    encryption: bool,
    name: String,
    timeout: Duration,
}

impl ConnectionParams {
    /// Default OpenAPI port.
    pub const DEFAULT_PORT: u16 = 8000;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default display name.
    pub const DEFAULT_NAME: &'static str = "Novastar H Series";

    /// Creates parameters for the specified host with default settings.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            use_https: false,
            project_id: String::new(),
            secret_key: String::new(),
            encryption: false,
            name: Self::DEFAULT_NAME.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Seeds parameters from a discovery result.
    #[must_use]
    pub fn from_discovery(device: &DiscoveredDevice) -> Self {
        let mut params = Self::new(device.host.clone()).with_port(device.port);
        if let Some(name) = &device.name {
            params.name.clone_from(name);
        }
        params
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Uses HTTPS instead of plain HTTP.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        self
    }

    /// Sets the project id (`pId`).
    #[must_use]
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    /// Sets the secret key.
    #[must_use]
    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = secret_key.into();
        self
    }

    /// Enables or disables DES payload encryption.
    #[must_use]
    pub fn with_encryption(mut self, enabled: bool) -> Self {
        self.encryption = enabled;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the project id.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Returns whether payload encryption is enabled.
    #[must_use]
    pub fn encryption(&self) -> bool {
        self.encryption
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from these parameters.
    ///
    /// A host given with an explicit scheme is used verbatim.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            return self.host.trim_end_matches('/').to_string();
        }
        let scheme = if self.use_https { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    /// Checks the parameters before a session is opened.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::MissingParameter` if the host is empty.
    pub fn validate(&self) -> Result<(), ValueError> {
        if self.host.trim().is_empty() {
            return Err(ValueError::MissingParameter("host"));
        }
        Ok(())
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_https", &self.use_https)
            .field("project_id", &self.project_id)
            .field("secret_key", &"<redacted>")
            .field("encryption", &self.encryption)
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// Session
// ============================================================================

/// Per-client session state: the codec keyed from the secret and the signer.
///
/// Owned by exactly one [`ApiClient`](crate::protocol::ApiClient); nothing
/// here is process-wide, so several devices can run side by side.
#[derive(Clone)]
pub struct Session {
    params: ConnectionParams,
    codec: TransportCodec,
    signer: Arc<dyn RequestSigner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("params", &self.params)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Derives a session using the vendor MD5 signer.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::KeyTooShort` if encryption is enabled with a
    /// secret key shorter than 8 bytes.
    pub fn new(params: ConnectionParams) -> Result<Self, CodecError> {
        Self::with_signer(params, Arc::new(Md5Signer))
    }

    /// Derives a session with a custom signing strategy.
    ///
    /// # Errors
    ///
    /// See [`Session::new`].
    pub fn with_signer(
        params: ConnectionParams,
        signer: Arc<dyn RequestSigner>,
    ) -> Result<Self, CodecError> {
        let codec = if params.encryption {
            TransportCodec::encrypted(&params.secret_key)?
        } else {
            TransportCodec::plain()
        };
        Ok(Self {
            params,
            codec,
            signer,
        })
    }

    /// Returns the connection parameters.
    #[must_use]
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Returns the transport codec.
    #[must_use]
    pub fn codec(&self) -> &TransportCodec {
        &self.codec
    }

    /// Signs a request body with the current time.
    #[must_use]
    pub fn sign(&self, body: &str) -> Signature {
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        self.sign_at(body, timestamp)
    }

    /// Signs a request body for a given timestamp.
    #[must_use]
    pub fn sign_at(&self, body: &str, timestamp: String) -> Signature {
        let sign = self.signer.sign(&SigningInput {
            project_id: &self.params.project_id,
            secret_key: &self.params.secret_key,
            timestamp: &timestamp,
            body,
            encrypted: self.codec.is_encrypted(),
        });
        Signature {
            project_id: self.params.project_id.clone(),
            timestamp,
            sign,
        }
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `novastar_lib` library.
//!
//! Errors are grouped by the layer that produces them: value validation,
//! HTTP transport, response parsing, payload encryption, and device-side
//! command rejection. [`Error::kind`] flattens the hierarchy into the
//! [`ErrorKind`] taxonomy that the coordinator and callers branch on.

use std::fmt;

use thiserror::Error;

/// The main error type for this library.
///
/// `Error` is `Clone` so that a single poll outcome can be handed to every
/// caller waiting on it. Transport failures are therefore captured as
/// messages instead of wrapping the underlying `reqwest` error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during HTTP communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred while encrypting or decrypting a payload.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The device refused a command.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// The session has been stopped and no longer talks to the device.
    #[error("session stopped")]
    Stopped,

    /// A poll ended without producing a result while the session kept running.
    #[error("poll aborted")]
    Aborted,
}

/// Flat classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The device could not be reached or answered with a server error.
    ConnectionRefused,
    /// The request did not complete within the configured timeout.
    Timeout,
    /// Credentials were rejected or the response could not be decrypted.
    AuthFailed,
    /// The response did not match the expected schema.
    MalformedResponse,
    /// The device answered a write with a failure status.
    CommandRejected,
    /// A caller-supplied argument was invalid; nothing was sent.
    InvalidArgument,
    /// A payload could not be encrypted or decrypted.
    CodecError,
    /// The session has been stopped.
    Stopped,
    /// A poll ended without a result; a later poll may succeed.
    Aborted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConnectionRefused => "connection refused",
            Self::Timeout => "timeout",
            Self::AuthFailed => "authentication failed",
            Self::MalformedResponse => "malformed response",
            Self::CommandRejected => "command rejected",
            Self::InvalidArgument => "invalid argument",
            Self::CodecError => "codec error",
            Self::Stopped => "stopped",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Value(_) => ErrorKind::InvalidArgument,
            Self::Protocol(ProtocolError::Timeout(_)) => ErrorKind::Timeout,
            Self::Protocol(ProtocolError::AuthenticationFailed(_)) => ErrorKind::AuthFailed,
            Self::Protocol(ProtocolError::ConnectionRefused(_) | ProtocolError::InvalidAddress(_)) => {
                ErrorKind::ConnectionRefused
            }
            Self::Parse(_) => ErrorKind::MalformedResponse,
            Self::Codec(_) => ErrorKind::CodecError,
            Self::Device(_) => ErrorKind::CommandRejected,
            Self::Stopped => ErrorKind::Stopped,
            Self::Aborted => ErrorKind::Aborted,
        }
    }

    /// Returns `true` if a later poll may succeed without reconfiguration.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ConnectionRefused
                | ErrorKind::Timeout
                | ErrorKind::MalformedResponse
                | ErrorKind::CodecError
                | ErrorKind::Aborted
        )
    }

    /// Returns `true` if the device rejected the session credentials.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        self.kind() == ErrorKind::AuthFailed
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// The preset id is not among the presets currently known for the device.
    #[error("unknown preset id {0}")]
    UnknownPreset(i64),

    /// A required connection parameter is missing or empty.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),
}

/// Errors related to HTTP communication.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The device could not be reached, or replied with a non-success HTTP status.
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The device rejected the project id / secret key pair.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
}

/// Errors related to parsing device responses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(String),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// Unexpected response format.
    #[error("unexpected response format: {0}")]
    UnexpectedFormat(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        // serde reports a missing key as "missing field `name` at line .."
        let message = err.to_string();
        if let Some(rest) = message.strip_prefix("missing field `")
            && let Some(field) = rest.split('`').next()
        {
            return Self::MissingField(field.to_string());
        }
        Self::Json(message)
    }
}

/// Errors raised by the transport codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Encryption was requested with a secret key shorter than a DES key.
    #[error("secret key is {0} bytes, encryption needs at least 8")]
    KeyTooShort(usize),

    /// The payload could not be serialized.
    #[error("failed to serialize payload: {0}")]
    Serialize(String),

    /// The ciphertext was not valid base64.
    #[error("ciphertext is not valid base64: {0}")]
    Base64(String),

    /// The ciphertext is not a whole number of cipher blocks.
    #[error("ciphertext length {0} is not a multiple of the block size")]
    BlockLength(usize),

    /// The ciphertext did not decrypt under the session key.
    #[error("decryption failed")]
    Decrypt,

    /// The decrypted plaintext is not a JSON document.
    #[error("decrypted payload is not valid JSON: {0}")]
    Plaintext(String),
}

/// Errors reported by the device for an accepted request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// Command was rejected by the device.
    #[error("command rejected with status {status}: {message}")]
    CommandRejected {
        /// Status code from the response envelope.
        status: i64,
        /// Message from the response envelope, if any.
        message: String,
    },

    /// The device does not know the requested preset.
    #[error("preset {0} not found on device")]
    PresetNotFound(i64),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outer response envelope shared by every endpoint.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;

/// Envelope status meaning success.
pub const STATUS_OK: i64 = 0;

/// Envelope statuses the firmware uses for signature or credential errors.
pub const AUTH_STATUSES: [i64; 2] = [401, 403];

/// Envelope status for an unknown object (e.g. a preset id).
pub const STATUS_NOT_FOUND: i64 = 404;

/// Response envelope: `{"status": 0, "msg": "...", "body": ...}`.
///
/// Some firmware places the payload under `data` instead of `body`.
///
/// # Examples
///
/// ```
/// use novastar_lib::response::Envelope;
///
/// let envelope = Envelope::parse(br#"{"status": 0, "msg": "ok", "data": {"a": 1}}"#).unwrap();
/// assert!(envelope.is_success());
/// assert!(envelope.body.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    /// Device status code, `0` on success.
    pub status: i64,

    /// Human-readable status message.
    #[serde(default)]
    pub msg: Option<String>,

    /// Payload, either an object or a base64 ciphertext string.
    #[serde(default, alias = "data")]
    pub body: Option<Value>,
}

impl Envelope {
    /// Parses an envelope from raw response bytes.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the bytes are not a JSON envelope.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        serde_json::from_slice(bytes).map_err(ParseError::from)
    }

    /// Returns `true` if the device reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Returns `true` if the device rejected the credentials.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        AUTH_STATUSES.contains(&self.status)
    }

    /// Returns the message, or a placeholder when the device sent none.
    #[must_use]
    pub fn message(&self) -> String {
        self.msg
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "no message".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_without_body() {
        let envelope = Envelope::parse(br#"{"status": 0}"#).unwrap();
        assert!(envelope.is_success());
        assert!(envelope.body.is_none());
        assert_eq!(envelope.message(), "no message");
    }

    #[test]
    fn envelope_requires_status() {
        let err = Envelope::parse(br#"{"body": {}}"#).unwrap_err();
        assert_eq!(err, ParseError::MissingField("status".to_string()));
    }

    #[test]
    fn envelope_auth_statuses() {
        let envelope = Envelope::parse(br#"{"status": 401, "msg": "sign error"}"#).unwrap();
        assert!(!envelope.is_success());
        assert!(envelope.is_auth_failure());
        assert_eq!(envelope.message(), "sign error");
    }

    #[test]
    fn envelope_rejects_non_json() {
        assert!(matches!(
            Envelope::parse(b"<html>"),
            Err(ParseError::Json(_))
        ));
    }
}

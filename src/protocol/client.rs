// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP API client for the processor.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::command::{
    BrightnessCommand, Command, FreezeCommand, OutputCommand, PowerCommand, PresetCommand,
};
use crate::error::{CodecError, DeviceError, Error, ParseError, ProtocolError, Result};
use crate::protocol::session::{ConnectionParams, Session};
use crate::protocol::signer::RequestSigner;
use crate::protocol::{Endpoint, Method};
use crate::response::{DeviceInfo, Envelope, PresetList, STATUS_NOT_FOUND, StatusResponse};
use crate::types::{Brightness, Preset, PresetId};

/// Typed client for the processor's HTTP API.
///
/// Each write is fire-and-confirm: the method returns once the device has
/// acknowledged the command and never re-reads state on its own.
///
/// # Examples
///
/// ```no_run
/// use novastar_lib::protocol::{ApiClient, ConnectionParams};
///
/// # async fn example() -> novastar_lib::Result<()> {
/// let client = ApiClient::new(
///     ConnectionParams::new("192.168.21.99")
///         .with_project_id("NDdi")
///         .with_secret_key("MmZjZWVm"),
/// )?;
/// let status = client.get_status().await?;
/// println!("brightness: {}", status.brightness());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    session: Session,
}

impl ApiClient {
    /// Creates a client using the vendor MD5 signer.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if the host is empty, `Error::Codec` if
    /// encryption is enabled with a key shorter than 8 bytes, and
    /// `Error::Protocol` if the HTTP client cannot be created. No request is
    /// sent in any case.
    pub fn new(params: ConnectionParams) -> Result<Self> {
        params.validate()?;
        let session = Session::new(params)?;
        Self::from_session(session)
    }

    /// Creates a client with a custom request signer.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn with_signer(params: ConnectionParams, signer: Arc<dyn RequestSigner>) -> Result<Self> {
        params.validate()?;
        let session = Session::with_signer(params, signer)?;
        Self::from_session(session)
    }

    fn from_session(session: Session) -> Result<Self> {
        let timeout = session.params().timeout();
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ProtocolError::InvalidAddress(e.to_string()))?;

        Ok(Self {
            base_url: session.params().base_url(),
            client,
            session,
        })
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the session this client owns.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    // ========== Reads ==========

    /// Reads power, output, brightness and active preset.
    ///
    /// # Errors
    ///
    /// Returns a network, auth, or `MalformedResponse` error.
    pub async fn get_status(&self) -> Result<StatusResponse> {
        self.read(Endpoint::Status).await
    }

    /// Reads model and firmware information.
    ///
    /// # Errors
    ///
    /// Returns a network, auth, or `MalformedResponse` error.
    pub async fn get_device_info(&self) -> Result<DeviceInfo> {
        self.read(Endpoint::DeviceInfo).await
    }

    /// Reads the ordered preset list.
    ///
    /// # Errors
    ///
    /// Returns a network, auth, or `MalformedResponse` error.
    pub async fn list_presets(&self) -> Result<Vec<Preset>> {
        let list: PresetList = self.read(Endpoint::Presets).await?;
        Ok(list.into_presets())
    }

    /// Verifies that the device answers an authenticated request.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying device-info read.
    pub async fn check_connection(&self) -> Result<DeviceInfo> {
        let info = self.get_device_info().await?;
        tracing::info!(
            url = %self.base_url,
            model = %info.model,
            firmware = %info.firmware,
            "Device connection verified"
        );
        Ok(info)
    }

    // ========== Writes ==========

    /// Sends a write command and waits for the acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns `CommandRejected` if the device answers with a failure status,
    /// or a network/auth/codec error.
    pub async fn send_command<C: Command + Sync>(&self, command: &C) -> Result<()> {
        self.write(command.endpoint().path(), &command.payload())
            .await
            .map(|_| ())
    }

    /// Switches the processor on or off.
    ///
    /// # Errors
    ///
    /// See [`send_command`](Self::send_command).
    pub async fn set_power(&self, on: bool) -> Result<()> {
        self.send_command(&PowerCommand::new(on)).await
    }

    /// Sets screen brightness.
    ///
    /// # Errors
    ///
    /// See [`send_command`](Self::send_command).
    pub async fn set_brightness(&self, value: Brightness) -> Result<()> {
        self.send_command(&BrightnessCommand::new(value)).await
    }

    /// Loads a preset.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::PresetNotFound` if the device does not know the
    /// id, otherwise see [`send_command`](Self::send_command).
    pub async fn set_preset(&self, id: PresetId) -> Result<()> {
        match self.send_command(&PresetCommand::new(id)).await {
            Err(Error::Device(DeviceError::CommandRejected { status, .. }))
                if status == STATUS_NOT_FOUND =>
            {
                Err(DeviceError::PresetNotFound(id.value()).into())
            }
            other => other,
        }
    }

    /// Shows content (`true`) or fades the screen to black (`false`).
    ///
    /// # Errors
    ///
    /// See [`send_command`](Self::send_command).
    pub async fn set_output(&self, on: bool) -> Result<()> {
        self.send_command(&OutputCommand::new(on)).await
    }

    /// Like [`set_output`](Self::set_output) with a fade duration.
    ///
    /// # Errors
    ///
    /// See [`send_command`](Self::send_command).
    pub async fn set_output_with_transition(&self, on: bool, transition: Duration) -> Result<()> {
        self.send_command(&OutputCommand::new(on).with_transition(transition))
            .await
    }

    /// Freezes or unfreezes the displayed frame.
    ///
    /// # Errors
    ///
    /// See [`send_command`](Self::send_command).
    pub async fn set_freeze(&self, enable: bool) -> Result<()> {
        self.send_command(&FreezeCommand::new(enable)).await
    }

    /// Sends a request to an arbitrary path and returns the decoded body.
    ///
    /// # Errors
    ///
    /// Returns the same errors as the typed operations for the given method.
    pub async fn send_raw(&self, method: Method, path: &str, payload: &Value) -> Result<Option<Value>> {
        match method {
            Method::Get => self.get_body(path).await.map(Some),
            Method::Post => self.write(path, payload).await,
        }
    }

    // ========== Request plumbing ==========

    async fn read<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T> {
        let body = self.get_body(endpoint.path()).await?;
        serde_json::from_value(body).map_err(|e| ParseError::from(e).into())
    }

    async fn get_body(&self, path: &str) -> Result<Value> {
        let url = self.build_url(path);
        tracing::debug!(path, "Sending GET request");

        let envelope = self.execute(self.client.get(&url), path).await?;
        if !envelope.is_success() {
            return Err(ParseError::UnexpectedFormat(format!(
                "status {} on read: {}",
                envelope.status,
                envelope.message()
            ))
            .into());
        }
        let body = envelope
            .body
            .ok_or_else(|| ParseError::MissingField("body".to_string()))?;
        self.decode_body(body)
    }

    async fn write(&self, path: &str, payload: &Value) -> Result<Option<Value>> {
        let request = self.build_envelope(payload)?;
        tracing::debug!(path, "Sending POST request");

        let url = format!("{}{path}", self.base_url);
        let envelope = self
            .execute(self.client.post(&url).json(&request), path)
            .await?;
        if !envelope.is_success() {
            tracing::debug!(path, status = envelope.status, "Command rejected");
            return Err(DeviceError::CommandRejected {
                status: envelope.status,
                message: envelope.message(),
            }
            .into());
        }
        envelope.body.map(|b| self.decode_body(b)).transpose()
    }

    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<Envelope> {
        let response = request.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProtocolError::AuthenticationFailed(format!("HTTP {}", status.as_u16())).into());
        }
        if !status.is_success() {
            return Err(ProtocolError::ConnectionRefused(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            ))
            .into());
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(&e))?;
        tracing::debug!(path, len = bytes.len(), "Received HTTP response");

        let envelope = Envelope::parse(&bytes)?;
        if envelope.is_auth_failure() {
            return Err(ProtocolError::AuthenticationFailed(envelope.message()).into());
        }
        Ok(envelope)
    }

    fn decode_body(&self, body: Value) -> Result<Value> {
        self.session.codec().decode_body(body).map_err(|e| match e {
            CodecError::Decrypt => ProtocolError::AuthenticationFailed(
                "response did not decrypt under the session key".to_string(),
            )
            .into(),
            other => other.into(),
        })
    }

    fn build_envelope(&self, payload: &Value) -> Result<Value> {
        let body = self.session.codec().encode_body(payload)?;
        let signed_text = match &body {
            Value::String(ciphertext) => ciphertext.clone(),
            other => other.to_string(),
        };
        let signature = self.session.sign(&signed_text);
        Ok(json!({
            "pId": signature.project_id,
            "timeStamp": signature.timestamp,
            "sign": signature.sign,
            "body": body,
        }))
    }

    /// Builds a signed GET URL.
    fn build_url(&self, path: &str) -> String {
        let signature = self.session.sign("");
        format!(
            "{}{path}?pId={}&timeStamp={}&sign={}",
            self.base_url,
            urlencoding::encode(&signature.project_id),
            urlencoding::encode(&signature.timestamp),
            urlencoding::encode(&signature.sign),
        )
    }

    fn transport_error(&self, err: &reqwest::Error) -> Error {
        if err.is_timeout() {
            let millis = u64::try_from(self.session.params().timeout().as_millis()).unwrap_or(u64::MAX);
            tracing::debug!(url = %self.base_url, "Request timed out");
            return ProtocolError::Timeout(millis).into();
        }
        if err.is_builder() {
            return ProtocolError::InvalidAddress(err.to_string()).into();
        }
        ProtocolError::ConnectionRefused(err.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(params: ConnectionParams) -> ApiClient {
        ApiClient::new(params).unwrap()
    }

    #[test]
    fn base_url_from_params() {
        let c = client(ConnectionParams::new("192.168.1.100"));
        assert_eq!(c.base_url(), "http://192.168.1.100:8000");
    }

    #[test]
    fn build_url_carries_signature() {
        let c = client(ConnectionParams::new("192.168.1.100").with_project_id("p id"));
        let url = c.build_url("/api/status");
        assert!(url.starts_with("http://192.168.1.100:8000/api/status?pId=p%20id&timeStamp="));
        assert!(url.contains("&sign="));
    }

    #[test]
    fn plain_envelope_keeps_payload() {
        let c = client(ConnectionParams::new("h").with_project_id("NDdi"));
        let envelope = c.build_envelope(&json!({"value": 55})).unwrap();
        assert_eq!(envelope["body"], json!({"value": 55}));
        assert_eq!(envelope["pId"], json!("NDdi"));
        assert!(envelope["sign"].is_string());
        assert!(envelope["timeStamp"].is_string());
    }

    #[test]
    fn encrypted_envelope_hides_payload() {
        let c = client(
            ConnectionParams::new("h")
                .with_secret_key("MmZjZWVm")
                .with_encryption(true),
        );
        let envelope = c.build_envelope(&json!({"value": 55})).unwrap();
        let body = envelope["body"].clone();
        assert!(body.is_string());
        assert_eq!(
            c.session().codec().decode_body(body).unwrap(),
            json!({"value": 55})
        );
    }

    #[test]
    fn short_key_fails_before_any_request() {
        let err = ApiClient::new(
            ConnectionParams::new("h")
                .with_secret_key("abcd")
                .with_encryption(true),
        )
        .unwrap_err();
        assert_eq!(err, Error::Codec(CodecError::KeyTooShort(4)));
    }

    #[test]
    fn empty_host_is_rejected() {
        let err = ApiClient::new(ConnectionParams::new("")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidArgument);
    }

    #[test]
    fn undecryptable_body_is_auth_failure() {
        let c = client(
            ConnectionParams::new("h")
                .with_secret_key("12345678")
                .with_encryption(true),
        );
        let other = crate::protocol::TransportCodec::encrypted("87654321").unwrap();
        let foreign = other.encode_body(&json!({"power": true})).unwrap();
        // A wrong key almost always breaks the padding; if it happens to pad
        // correctly the plaintext is still not JSON.
        let err = c.decode_body(foreign).unwrap_err();
        assert!(matches!(
            err.kind(),
            crate::error::ErrorKind::AuthFailed | crate::error::ErrorKind::CodecError
        ));
    }
}

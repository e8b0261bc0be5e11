// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport codec for request and response bodies.
//!
//! With encryption disabled the codec is plain JSON. With encryption enabled
//! the serialized JSON is encrypted with DES in ECB mode (PKCS#5 padding)
//! under the first eight bytes of the secret key, and travels inside the
//! envelope as a base64 string.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use des::Des;
use ecb::cipher::block_padding::Pkcs7;
use ecb::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};
use serde_json::Value;

use crate::error::CodecError;

type DesEcbEnc = ecb::Encryptor<Des>;
type DesEcbDec = ecb::Decryptor<Des>;

/// Length of a DES key in bytes.
pub const KEY_LEN: usize = 8;

/// Pure encode/decode transform for payloads.
///
/// # Examples
///
/// ```
/// use novastar_lib::protocol::TransportCodec;
/// use serde_json::json;
///
/// let codec = TransportCodec::encrypted("MmZjZWVm").unwrap();
/// let payload = json!({"value": 55});
/// let bytes = codec.encode(&payload).unwrap();
/// assert_eq!(codec.decode(&bytes).unwrap(), payload);
///
/// assert!(TransportCodec::encrypted("abcd").is_err());
/// ```
#[derive(Clone)]
pub struct TransportCodec {
    key: Option<[u8; KEY_LEN]>,
}

impl std::fmt::Debug for TransportCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportCodec")
            .field("encrypted", &self.key.is_some())
            .finish()
    }
}

impl TransportCodec {
    /// Creates a codec that passes JSON through unencrypted.
    #[must_use]
    pub const fn plain() -> Self {
        Self { key: None }
    }

    /// Creates an encrypting codec keyed from the first 8 bytes of `secret_key`.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::KeyTooShort` if the key has fewer than 8 bytes.
    pub fn encrypted(secret_key: &str) -> Result<Self, CodecError> {
        let bytes = secret_key.as_bytes();
        let key: [u8; KEY_LEN] = bytes
            .get(..KEY_LEN)
            .and_then(|prefix| prefix.try_into().ok())
            .ok_or(CodecError::KeyTooShort(bytes.len()))?;
        Ok(Self { key: Some(key) })
    }

    /// Returns `true` if payloads are encrypted.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        self.key.is_some()
    }

    /// Serializes a payload and encrypts it when a key is set.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Serialize` if the payload cannot be serialized.
    pub fn encode(&self, payload: &Value) -> Result<Vec<u8>, CodecError> {
        let plaintext =
            serde_json::to_vec(payload).map_err(|e| CodecError::Serialize(e.to_string()))?;
        match &self.key {
            None => Ok(plaintext),
            Some(key) => {
                let cipher =
                    DesEcbEnc::new_from_slice(key).map_err(|_| CodecError::KeyTooShort(key.len()))?;
                Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(&plaintext))
            }
        }
    }

    /// Decrypts (when a key is set) and parses a payload.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::BlockLength` if the ciphertext is not a whole
    /// number of DES blocks, `CodecError::Decrypt` if its padding is invalid
    /// under the key, or `CodecError::Plaintext` if the result is not JSON.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        let plaintext = match &self.key {
            None => bytes.to_vec(),
            Some(key) => {
                // No key turns a whole number of blocks into a partial one.
                if bytes.is_empty() || bytes.len() % KEY_LEN != 0 {
                    return Err(CodecError::BlockLength(bytes.len()));
                }
                let cipher =
                    DesEcbDec::new_from_slice(key).map_err(|_| CodecError::KeyTooShort(key.len()))?;
                cipher
                    .decrypt_padded_vec_mut::<Pkcs7>(bytes)
                    .map_err(|_| CodecError::Decrypt)?
            }
        };
        serde_json::from_slice(&plaintext).map_err(|e| CodecError::Plaintext(e.to_string()))
    }

    /// Encodes a payload into the form carried by the request envelope.
    ///
    /// Plain payloads are returned as-is; encrypted payloads become a base64
    /// string of the ciphertext.
    ///
    /// # Errors
    ///
    /// See [`encode`](Self::encode).
    pub fn encode_body(&self, payload: &Value) -> Result<Value, CodecError> {
        if self.key.is_none() {
            return Ok(payload.clone());
        }
        let ciphertext = self.encode(payload)?;
        Ok(Value::String(STANDARD.encode(ciphertext)))
    }

    /// Decodes a body taken from a response envelope.
    ///
    /// An encrypting codec expects a base64 string; an object or array in
    /// that position is accepted unchanged, since some endpoints answer in
    /// clear even when the session is encrypted.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Base64` for a string that is not base64, and the
    /// errors of [`decode`](Self::decode) otherwise.
    pub fn decode_body(&self, body: Value) -> Result<Value, CodecError> {
        match (body, self.key.is_some()) {
            (Value::String(encoded), true) => {
                let ciphertext = STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| CodecError::Base64(e.to_string()))?;
                self.decode(&ciphertext)
            }
            (other, _) => Ok(other),
        }
    }
}

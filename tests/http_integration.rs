// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP API client using wiremock.

use std::time::Duration;

use novastar_lib::error::{DeviceError, ErrorKind};
use novastar_lib::protocol::{ApiClient, ConnectionParams, Method, TransportCodec};
use novastar_lib::types::{Brightness, OutputState, PowerState, PresetId};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "MmZjZWVmYjQ";

fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": 0, "msg": "ok", "body": body}))
}

fn ack() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"status": 0, "msg": "ok"}))
}

fn status_body() -> Value {
    json!({"power": true, "output": 1, "brightness": 30, "presetId": 2})
}

fn plain_client(server: &MockServer) -> ApiClient {
    ApiClient::new(ConnectionParams::new(server.uri()).with_project_id("NDdi")).unwrap()
}

fn encrypted_client(server: &MockServer) -> ApiClient {
    ApiClient::new(
        ConnectionParams::new(server.uri())
            .with_project_id("NDdi")
            .with_secret_key(SECRET)
            .with_encryption(true),
    )
    .unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

// ============================================================================
// Reads
// ============================================================================

mod reads {
    use super::*;

    #[tokio::test]
    async fn get_status_parses_and_signs() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/status"))
            .and(query_param("pId", "NDdi"))
            .respond_with(ok(status_body()))
            .expect(1)
            .mount(&server)
            .await;

        let status = plain_client(&server).get_status().await.unwrap();
        assert_eq!(status.power(), PowerState::On);
        assert_eq!(status.output(), OutputState::Visible);
        assert_eq!(status.brightness().value(), 30);
        assert_eq!(status.preset_id(), Some(PresetId::new(2)));

        let requests = server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or_default().to_string();
        assert!(query.contains("timeStamp="));
        assert!(query.contains("sign="));
    }

    #[tokio::test]
    async fn get_status_accepts_data_alias() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 0,
                "data": {"power": 0, "output": false, "brightness": 0, "presetId": null}
            })))
            .mount(&server)
            .await;

        let status = plain_client(&server).get_status().await.unwrap();
        assert_eq!(status.power(), PowerState::Off);
        assert_eq!(status.output(), OutputState::Blanked);
        assert_eq!(status.preset_id(), None);
    }

    #[tokio::test]
    async fn missing_power_field_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(ok(json!({"output": 1, "brightness": 30, "presetId": 2})))
            .mount(&server)
            .await;

        let err = plain_client(&server).get_status().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(err.to_string().contains("power"));
    }

    #[tokio::test]
    async fn brightness_out_of_range_in_response_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(ok(
                json!({"power": 1, "output": 1, "brightness": 140, "presetId": 1}),
            ))
            .mount(&server)
            .await;

        let err = plain_client(&server).get_status().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn non_json_response_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;

        let err = plain_client(&server).get_status().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn failure_status_on_read_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/presets"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": 7, "msg": "busy"})),
            )
            .mount(&server)
            .await;

        let err = plain_client(&server).list_presets().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn list_presets_keeps_device_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/presets"))
            .respond_with(ok(json!({"presets": [
                {"id": 5, "name": "Show"},
                {"id": 1, "label": "Idle"},
            ]})))
            .mount(&server)
            .await;

        let presets = plain_client(&server).list_presets().await.unwrap();
        let labels: Vec<_> = presets.iter().map(|p| p.label()).collect();
        assert_eq!(labels, ["Show", "Idle"]);
        assert_eq!(presets[0].id(), PresetId::new(5));
    }

    #[tokio::test]
    async fn check_connection_returns_device_info() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/device"))
            .respond_with(ok(json!({
                "model": "H5",
                "firmware": "2.1.0",
                "sn": "NSH5-0042",
                "temp": 1,
                "status": 1,
                "powerList": [{"iSignal": 1}]
            })))
            .mount(&server)
            .await;

        let info = plain_client(&server).check_connection().await.unwrap();
        assert_eq!(info.model, "H5");
        assert_eq!(info.serial.as_deref(), Some("NSH5-0042"));
        assert!(info.temperature_warning());
        assert_eq!(info.ready, Some(true));
        assert_eq!(info.signal_status, Some(1));
    }
}

// ============================================================================
// Writes
// ============================================================================

mod writes {
    use super::*;

    #[tokio::test]
    async fn set_brightness_posts_signed_envelope() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/brightness"))
            .and(body_partial_json(json!({"pId": "NDdi", "body": {"value": 55}})))
            .respond_with(ack())
            .expect(1)
            .mount(&server)
            .await;

        plain_client(&server)
            .set_brightness(Brightness::new(55).unwrap())
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let envelope: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(envelope["sign"].is_string());
        assert!(envelope["timeStamp"].is_string());
    }

    #[tokio::test]
    async fn writes_do_not_poll() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/power"))
            .and(body_partial_json(json!({"body": {"on": false}})))
            .respond_with(ack())
            .mount(&server)
            .await;

        plain_client(&server).set_power(false).await.unwrap();
        assert_eq!(request_count(&server).await, 1);
    }

    #[tokio::test]
    async fn output_with_transition_sends_seconds() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/output"))
            .and(body_partial_json(json!({"body": {"on": false, "time": 3}})))
            .respond_with(ack())
            .expect(1)
            .mount(&server)
            .await;

        plain_client(&server)
            .set_output_with_transition(false, Duration::from_secs(3))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn set_freeze_posts_enable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/freeze"))
            .and(body_partial_json(json!({"body": {"enable": true}})))
            .respond_with(ack())
            .expect(1)
            .mount(&server)
            .await;

        plain_client(&server).set_freeze(true).await.unwrap();
    }

    #[tokio::test]
    async fn failure_status_is_command_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/power"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": 12, "msg": "locked"})),
            )
            .mount(&server)
            .await;

        let err = plain_client(&server).set_power(true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandRejected);
        assert!(err.to_string().contains("locked"));
    }

    #[tokio::test]
    async fn unknown_preset_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/preset"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": 404, "msg": "no preset"})),
            )
            .mount(&server)
            .await;

        let err = plain_client(&server)
            .set_preset(PresetId::new(99))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            novastar_lib::Error::Device(DeviceError::PresetNotFound(99))
        );
    }

    #[tokio::test]
    async fn send_raw_get_returns_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/custom"))
            .respond_with(ok(json!({"answer": 42})))
            .mount(&server)
            .await;

        let body = plain_client(&server)
            .send_raw(Method::Get, "/api/custom", &Value::Null)
            .await
            .unwrap();
        assert_eq!(body, Some(json!({"answer": 42})));
    }
}

// ============================================================================
// Transport errors
// ============================================================================

mod errors {
    use super::*;

    #[tokio::test]
    async fn http_unauthorized_is_auth_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = plain_client(&server).get_status().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthFailed);
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn envelope_auth_status_is_auth_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": 403, "msg": "sign error"})),
            )
            .mount(&server)
            .await;

        let err = plain_client(&server).set_power(true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthFailed);
    }

    #[tokio::test]
    async fn server_error_is_connection_refused() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = plain_client(&server).get_status().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionRefused);
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn slow_device_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ok(status_body()).set_delay(Duration::from_millis(800)))
            .mount(&server)
            .await;

        let client = ApiClient::new(
            ConnectionParams::new(server.uri()).with_timeout(Duration::from_millis(100)),
        )
        .unwrap();
        let err = client.get_status().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn closed_port_is_connection_refused() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let client = ApiClient::new(ConnectionParams::new(uri)).unwrap();
        let err = client.get_status().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionRefused);
    }
}

// ============================================================================
// Encryption
// ============================================================================

mod encryption {
    use super::*;

    fn encrypted(body: &Value) -> ResponseTemplate {
        let codec = TransportCodec::encrypted(SECRET).unwrap();
        ResponseTemplate::new(200)
            .set_body_json(json!({"status": 0, "body": codec.encode_body(body).unwrap()}))
    }

    #[tokio::test]
    async fn encrypted_status_is_decrypted() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(encrypted(&status_body()))
            .mount(&server)
            .await;

        let status = encrypted_client(&server).get_status().await.unwrap();
        assert_eq!(status.brightness().value(), 30);
    }

    #[tokio::test]
    async fn encrypted_write_hides_payload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/brightness"))
            .respond_with(ack())
            .expect(1)
            .mount(&server)
            .await;

        encrypted_client(&server)
            .set_brightness(Brightness::new(55).unwrap())
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let envelope: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let body = envelope["body"].clone();
        assert!(body.is_string());

        let codec = TransportCodec::encrypted(SECRET).unwrap();
        assert_eq!(codec.decode_body(body).unwrap(), json!({"value": 55}));
    }

    #[tokio::test]
    async fn truncated_ciphertext_is_transient_codec_error() {
        let server = MockServer::start().await;

        // Five bytes cannot be a DES block sequence under any key.
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": 0, "body": "AAAAAAA="})),
            )
            .mount(&server)
            .await;

        let err = encrypted_client(&server).get_status().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CodecError);
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn wrong_key_is_auth_failure() {
        let server = MockServer::start().await;

        // A status body encrypted under "MmZjZWVm"; under "WrOnGkEy" the last
        // block decrypts to invalid padding.
        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 0,
                "body": "3kIlg9+V5gQVj9Eog5I6p4qr5Y7YaLVv14m6LlELzaF8a2742D4qYPzGqrmJ6DkTGgsWHFZQwRk="
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(
            ConnectionParams::new(server.uri())
                .with_project_id("NDdi")
                .with_secret_key("WrOnGkEy")
                .with_encryption(true),
        )
        .unwrap();
        let err = client.get_status().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthFailed);
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn non_base64_body_is_codec_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"status": 0, "body": "not base64 at all!"})),
            )
            .mount(&server)
            .await;

        let err = encrypted_client(&server).get_status().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CodecError);
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn short_key_fails_before_any_request() {
        let server = MockServer::start().await;

        let err = ApiClient::new(
            ConnectionParams::new(server.uri())
                .with_secret_key("abcd")
                .with_encryption(true),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CodecError);
        assert_eq!(request_count(&server).await, 0);
    }
}

// ============================================================================
// Discovery
// ============================================================================

mod discovery {
    use super::*;

    #[tokio::test]
    async fn probe_reports_device() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/device"))
            .respond_with(ok(json!({"model": "H2", "firmware": "1.0", "sn": "NS-1"})))
            .mount(&server)
            .await;

        let address = server.address();
        let found = novastar_lib::probe(address.ip().to_string(), address.port())
            .await
            .unwrap();
        assert_eq!(found.port, address.port());
        assert_eq!(found.model.as_deref(), Some("H2"));
        assert_eq!(found.serial.as_deref(), Some("NS-1"));
        assert_eq!(found.display_name(), "Novastar H2");
    }

    #[tokio::test]
    async fn probe_rejects_non_device() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let address = server.address();
        let err = novastar_lib::probe(address.ip().to_string(), address.port())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }
}

#![allow(clippy::unwrap_used)]
// Integration tests for the coordinator, entities and setup flow, driven
// against a wiremock stand-in for the vendor API.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use solity_core::{
    CoordinatorError, CoreError, Credentials, Entity, EntitySet, Integration, IntegrationConfig,
    RefreshState,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer, update_interval: Duration) -> IntegrationConfig {
    let base_url = Url::parse(&format!("{}/api_v2", server.uri())).unwrap();
    IntegrationConfig::new(Credentials::new("owner@example.com", "hunter2"))
        .unwrap()
        .with_base_url(base_url)
        .with_update_interval(update_interval)
        .with_timeout(Duration::from_secs(2))
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api_v2/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": 0,
            "contents": { "authToken": "tok-1", "authPwd": "pwd-1" }
        })))
        .mount(server)
        .await;
}

async fn mount_devices(server: &MockServer, devices: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api_v2/myDevice"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": 0, "contents": { "myDeviceList": devices } })),
        )
        .mount(server)
        .await;
}

async fn mount_command(server: &MockServer, device_id: &str, command: &str) {
    Mock::given(method("PUT"))
        .and(path(format!("/api_v2/controlDevice/{device_id}")))
        .and(body_json(json!({ "command": command })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": 0 })))
        .mount(server)
        .await;
}

fn a1() -> serde_json::Value {
    json!({ "myDeviceId": "A1", "battery": 55, "gatewayConnectionStatus": "Y" })
}

/// Integration with a single online device and a poll interval long enough
/// that only explicit refreshes run.
async fn setup_a1() -> (MockServer, Integration, EntitySet) {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_devices(&server, json!([a1()])).await;

    let integration = Integration::setup(config_for(&server, Duration::from_secs(3600)), reqwest::Client::new())
        .await
        .unwrap();
    let entities = integration.entities();
    (server, integration, entities)
}

// ── Setup ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_setup_builds_snapshot_and_entities() {
    let (_server, integration, entities) = setup_a1().await;

    let state = integration.coordinator().device("A1").unwrap();
    assert_eq!(state.battery, 55);
    assert_eq!(state.is_locked, None);
    assert!(state.gateway_connected);
    assert_eq!(state.model, "Unknown");
    assert_eq!(state.nickname, "Solity Lock");
    assert_eq!(state.firmware, "Unknown");

    assert_eq!(entities.locks.len(), 1);
    assert_eq!(entities.sensors.len(), 1);

    let sensor = entities.sensor("A1").unwrap();
    assert_eq!(sensor.native_value(), Some(55));
    assert_eq!(sensor.unique_id(), "solity_A1_battery");
    assert_eq!(sensor.name(), "Battery");
    assert!(sensor.available());

    let lock = entities.lock("A1").unwrap();
    assert_eq!(lock.unique_id(), "solity_A1_lock");
    assert_eq!(lock.name(), "Lock");
    assert_eq!(lock.device_info().model, "LAVO");
    assert!(lock.available());
    assert_eq!(lock.is_locked(), None);

    let attrs = lock.extra_state_attributes().unwrap();
    assert_eq!(attrs.battery_level, 55);
    assert_eq!(attrs.model, "Unknown");
    assert!(attrs.gateway_connected);

    assert!(integration.coordinator().last_update_success());
    integration.unload().await;
}

#[tokio::test]
async fn test_setup_with_bad_credentials_registers_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api_v2/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": 1, "errorMessage": "wrong password" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api_v2/myDevice"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = Integration::setup(config_for(&server, Duration::from_secs(3600)), reqwest::Client::new()).await;
    let Err(err) = result else {
        panic!("setup should fail");
    };
    assert!(err.needs_reauth());
    assert!(matches!(err, CoreError::AuthenticationFailed { ref message } if message == "wrong password"));
}

#[tokio::test]
async fn test_failed_first_refresh_halts_setup() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api_v2/myDevice"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": 0, "contents": { "myDeviceList": [a1()] } })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api_v2/myDevice"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = Integration::setup(config_for(&server, Duration::from_secs(3600)), reqwest::Client::new()).await;
    assert!(matches!(result, Err(CoreError::NotReady { .. })));
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_drops_stale_devices() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_devices(
        &server,
        json!([a1(), { "myDeviceId": "B2", "battery": "80", "gatewayConnectionStatus": "Y" }]),
    )
    .await;

    let integration = Integration::setup(config_for(&server, Duration::from_secs(3600)), reqwest::Client::new())
        .await
        .unwrap();
    let entities = integration.entities();
    assert_eq!(integration.coordinator().snapshot().unwrap().device_ids(), vec!["A1", "B2"]);
    assert_eq!(entities.sensor("B2").unwrap().native_value(), Some(80));

    server.reset().await;
    mount_devices(&server, json!([a1()])).await;
    integration.coordinator().refresh().await.unwrap();

    assert_eq!(integration.coordinator().snapshot().unwrap().device_ids(), vec!["A1"]);
    assert!(!entities.lock("B2").unwrap().available());
    assert_eq!(entities.sensor("B2").unwrap().native_value(), Some(0));
    integration.unload().await;
}

#[tokio::test]
async fn test_gateway_offline_marks_entities_unavailable() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_devices(
        &server,
        json!([{ "myDeviceId": "A1", "battery": 40, "gatewayConnectionStatus": "N" }]),
    )
    .await;

    let integration = Integration::setup(config_for(&server, Duration::from_secs(3600)), reqwest::Client::new())
        .await
        .unwrap();
    let entities = integration.entities();

    assert!(!entities.lock("A1").unwrap().available());
    assert!(!entities.sensor("A1").unwrap().available());
    // Values are still readable while unavailable.
    assert_eq!(entities.sensor("A1").unwrap().native_value(), Some(40));
    integration.unload().await;
}

#[tokio::test]
async fn test_malformed_record_falls_back_to_defaults() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_devices(
        &server,
        json!([
            a1(),
            { "myDeviceId": 12345, "battery": -1, "gatewayConnectionStatus": true },
            { "myDeviceId": "C3", "battery": "", "gatewayConnectionStatus": 1 }
        ]),
    )
    .await;

    let integration = Integration::setup(config_for(&server, Duration::from_secs(3600)), reqwest::Client::new())
        .await
        .unwrap();
    let entities = integration.entities();

    let good = integration.coordinator().device("A1").unwrap();
    assert_eq!(good.battery, 55);
    assert!(good.gateway_connected);

    for id in ["12345", "C3"] {
        let state = integration.coordinator().device(id).unwrap();
        assert_eq!(state.battery, 0);
        assert!(!state.gateway_connected);
        assert!(!entities.lock(id).unwrap().available());
        assert_eq!(entities.sensor(id).unwrap().native_value(), Some(0));
    }
    assert_eq!(entities.locks.len(), 3);
    assert!(integration.coordinator().last_update_success());
    integration.unload().await;
}

#[tokio::test]
async fn test_update_failure_keeps_last_snapshot() {
    let (server, integration, entities) = setup_a1().await;

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api_v2/myDevice"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = integration.coordinator().refresh().await.unwrap_err();
    assert!(matches!(err, CoordinatorError::UpdateFailed { .. }));
    assert!(!integration.coordinator().last_update_success());
    assert!(matches!(
        *integration.coordinator().refresh_state().borrow(),
        RefreshState::UpdateFailed { .. }
    ));

    assert_eq!(entities.sensor("A1").unwrap().native_value(), Some(55));
    assert!(entities.lock("A1").unwrap().available());
    integration.unload().await;
}

#[tokio::test]
async fn test_vendor_error_on_device_list_is_update_failure() {
    let (server, integration, _entities) = setup_a1().await;

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api_v2/myDevice"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": 3, "errorMessage": "maintenance" })),
        )
        .mount(&server)
        .await;

    let err = integration.coordinator().refresh().await.unwrap_err();
    assert!(!err.is_auth_required());
    assert!(err.to_string().contains("maintenance"));
    integration.unload().await;
}

// ── Lock commands ───────────────────────────────────────────────────

#[tokio::test]
async fn test_lock_then_unlock_updates_lock_state() {
    let (server, integration, entities) = setup_a1().await;
    mount_command(&server, "A1", "close").await;
    mount_command(&server, "A1", "open").await;

    let lock = entities.lock("A1").unwrap();
    let updates = integration.coordinator().subscribe();

    lock.lock().await.unwrap();
    assert_eq!(lock.is_locked(), Some(true));
    assert!(updates.has_changed().unwrap());

    lock.unlock().await.unwrap();
    assert_eq!(lock.is_locked(), Some(false));
    integration.unload().await;
}

#[tokio::test]
async fn test_open_is_unlock() {
    let (server, integration, entities) = setup_a1().await;
    mount_command(&server, "A1", "close").await;
    mount_command(&server, "A1", "open").await;

    let lock = entities.lock("A1").unwrap();
    lock.lock().await.unwrap();
    lock.open().await.unwrap();
    assert_eq!(lock.is_locked(), Some(false));
    integration.unload().await;
}

#[tokio::test]
async fn test_next_poll_forgets_lock_state() {
    let (server, integration, entities) = setup_a1().await;
    mount_command(&server, "A1", "close").await;

    let lock = entities.lock("A1").unwrap();
    lock.lock().await.unwrap();
    assert_eq!(lock.is_locked(), Some(true));

    integration.coordinator().refresh().await.unwrap();
    assert_eq!(lock.is_locked(), None);
    integration.unload().await;
}

#[tokio::test]
async fn test_failed_command_leaves_lock_state_alone() {
    let (server, integration, entities) = setup_a1().await;
    Mock::given(method("PUT"))
        .and(path("/api_v2/controlDevice/A1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let lock = entities.lock("A1").unwrap();
    let err = lock.lock().await.unwrap_err();
    assert!(matches!(err, solity_api::Error::Http { status: 500 }));
    assert_eq!(lock.is_locked(), None);
    integration.unload().await;
}

#[tokio::test]
async fn test_non_zero_command_result_still_updates_lock_state() {
    let (server, integration, entities) = setup_a1().await;
    Mock::given(method("PUT"))
        .and(path("/api_v2/controlDevice/A1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": 9, "errorMessage": "gateway busy" })),
        )
        .mount(&server)
        .await;

    let lock = entities.lock("A1").unwrap();
    let response = lock.lock().await.unwrap();
    assert!(!response.is_success());
    assert_eq!(lock.is_locked(), Some(true));
    integration.unload().await;
}

// ── Polling ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_polling_refreshes_on_interval() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_devices(&server, json!([a1()])).await;

    let integration = Integration::setup(config_for(&server, Duration::from_millis(100)), reqwest::Client::new())
        .await
        .unwrap();
    let before = integration.coordinator().snapshot().unwrap().fetched_at;

    let mut stream = integration.coordinator().updates();
    tokio::time::timeout(Duration::from_secs(2), stream.changed())
        .await
        .unwrap()
        .unwrap();

    let after = integration.coordinator().snapshot().unwrap().fetched_at;
    assert!(after >= before);
    assert!(integration.coordinator().is_polling().await);
    integration.unload().await;
}

#[tokio::test]
async fn test_auth_failure_stops_polling() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_devices(&server, json!([a1()])).await;

    let integration = Integration::setup(config_for(&server, Duration::from_millis(100)), reqwest::Client::new())
        .await
        .unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api_v2/myDevice"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = integration.coordinator().refresh_state();
    tokio::time::timeout(
        Duration::from_secs(2),
        state.wait_for(|s| matches!(s, RefreshState::AuthFailed { .. })),
    )
    .await
    .unwrap()
    .unwrap();

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!integration.coordinator().is_polling().await);
    assert!(!integration.client().has_session().await);
    // Entities keep serving the last good snapshot.
    assert_eq!(integration.coordinator().device("A1").unwrap().battery, 55);
    integration.unload().await;
}

#[tokio::test]
async fn test_shutdown_mid_refresh_returns_to_idle() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api_v2/myDevice"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": 0, "contents": { "myDeviceList": [a1()] } })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api_v2/myDevice"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "result": 0, "contents": { "myDeviceList": [a1()] } }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let integration = Integration::setup(config_for(&server, Duration::from_millis(50)), reqwest::Client::new())
        .await
        .unwrap();
    let coordinator = integration.coordinator().clone();

    let mut state = coordinator.refresh_state();
    tokio::time::timeout(
        Duration::from_secs(1),
        state.wait_for(|s| matches!(s, RefreshState::Refreshing)),
    )
    .await
    .unwrap()
    .unwrap();

    coordinator.shutdown().await;
    assert_eq!(*coordinator.refresh_state().borrow(), RefreshState::Idle);
    assert!(!coordinator.is_polling().await);
    assert_eq!(coordinator.device("A1").unwrap().battery, 55);
    integration.unload().await;
}

#[tokio::test]
async fn test_unload_stops_polling_and_drops_session() {
    let (_server, integration, _entities) = setup_a1().await;
    let coordinator = integration.coordinator().clone();
    let client = std::sync::Arc::clone(integration.client());

    assert!(coordinator.is_polling().await);
    integration.unload().await;
    assert!(!coordinator.is_polling().await);
    assert!(!client.has_session().await);
}

#[tokio::test]
async fn test_reload_sets_up_again() {
    let (server, integration, _entities) = setup_a1().await;
    let config = integration.config().clone();

    let integration = integration.reload(config).await.unwrap();
    assert_eq!(integration.devices().len(), 1);
    assert!(integration.coordinator().is_polling().await);
    assert!(server.received_requests().await.is_some());
    integration.unload().await;
}

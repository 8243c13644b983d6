#![allow(clippy::unwrap_used)]
// Integration tests for the 3x-ui connector using wiremock.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use panelbridge::core::config::PanelConfig;
use panelbridge::core::kernel::{RestClientBuilder, RestClientConfig};
use panelbridge::core::traits::{AdminManagement, SystemInspection, UserManagement};
use panelbridge::panels::threexui::{self, ThreeXUiConnector};
use panelbridge::{PanelError, UserSpec};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ThreeXUiConnector<panelbridge::core::kernel::ReqwestRest>) {
    let server = MockServer::start().await;
    let config = PanelConfig::new(server.uri(), "admin", "secret-pw".to_string());
    let connector = threexui::build_connector(config).unwrap();
    (server, connector)
}

fn login_ok() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Set-Cookie", "3x-ui=sess123; Path=/; HttpOnly")
        .set_body_json(json!({ "success": true, "msg": "", "obj": null }))
}

async fn mount_login(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_partial_json(json!({ "username": "admin", "password": "secret-pw" })))
        .respond_with(login_ok())
        .expect(times)
        .mount(server)
        .await;
}

fn inbound_list_body() -> serde_json::Value {
    json!({
        "success": true,
        "msg": "",
        "obj": [
            {
                "id": 3,
                "remark": "main-vless",
                "protocol": "vless",
                "port": 443,
                "enable": true,
                "settings": "{\"clients\":[]}",
                "clientStats": [
                    { "email": "alice", "up": 10, "down": 20, "total": 0,
                      "expiryTime": 0, "enable": true }
                ]
            },
            {
                "id": 4,
                "remark": "backup",
                "protocol": "vmess",
                "port": 8443,
                "enable": false
            }
        ]
    })
}

// ── Session acquisition ─────────────────────────────────────────────

#[tokio::test]
async fn login_rejection_is_invalid_credentials() {
    let (server, connector) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false, "msg": "Invalid username or password", "obj": null
        })))
        .mount(&server)
        .await;

    let result = connector.list_inbounds().await;
    match result {
        Err(PanelError::InvalidCredentials(msg)) => {
            assert_eq!(msg, "Invalid username or password");
        }
        other => panic!("expected InvalidCredentials, got: {other:?}"),
    }
}

#[tokio::test]
async fn login_with_non_json_body_is_malformed_response() {
    let (server, connector) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login page</html>"))
        .mount(&server)
        .await;

    let result = connector.list_inbounds().await;
    assert!(
        matches!(result, Err(PanelError::MalformedResponse(_))),
        "expected MalformedResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn login_server_error_skips_body_parsing() {
    let (server, connector) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(502).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let result = connector.list_inbounds().await;
    match result {
        Err(PanelError::RemoteHttp { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "HTTP 502: Bad Gateway");
        }
        other => panic!("expected RemoteHttp, got: {other:?}"),
    }
}

#[tokio::test]
async fn login_without_cookie_is_malformed_response() {
    let (server, connector) = setup().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "obj": null })),
        )
        .mount(&server)
        .await;

    let result = connector.list_inbounds().await;
    assert!(
        matches!(result, Err(PanelError::MalformedResponse(_))),
        "expected MalformedResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn slow_panel_times_out_as_unreachable() {
    let server = MockServer::start().await;

    // The reply arrives well after the client deadline.
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(login_ok().set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = PanelConfig::new(server.uri(), "admin", "secret-pw".to_string());
    let rest_config =
        RestClientConfig::new(config.base_url.clone(), "threexui".to_string()).with_timeout(1);
    let rest = Arc::new(RestClientBuilder::new(rest_config).build().unwrap());
    let connector = ThreeXUiConnector::new(rest, config);

    let result = connector.list_inbounds().await;
    assert!(
        matches!(result, Err(PanelError::Unreachable(_))),
        "expected Unreachable, got: {result:?}"
    );
}

// ── Inbounds and stats ──────────────────────────────────────────────

#[tokio::test]
async fn list_inbounds_sends_cookie_and_converts() {
    let (server, connector) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/panel/api/inbounds/list"))
        .and(header("Cookie", "3x-ui=sess123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inbound_list_body()))
        .expect(1)
        .mount(&server)
        .await;

    let inbounds = connector.list_inbounds().await.unwrap();

    assert_eq!(inbounds.len(), 2);
    assert_eq!(inbounds[0].id, "3");
    assert_eq!(inbounds[0].tag, "main-vless");
    assert_eq!(inbounds[0].protocol, "vless");
    assert_eq!(inbounds[0].port, Some(443));
    assert!(inbounds[0].enabled);
    assert_eq!(inbounds[0].total_clients, Some(1));
    assert!(!inbounds[1].enabled);
}

#[tokio::test]
async fn system_stats_reports_only_inbound_count() {
    let (server, connector) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/panel/api/inbounds/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inbound_list_body()))
        .mount(&server)
        .await;

    let stats = connector.system_stats().await.unwrap();

    assert_eq!(stats.inbounds, Some(2));
    // Nothing else is available from this backend and nothing is invented.
    assert_eq!(stats.cpu_percent, None);
    assert_eq!(stats.memory_percent, None);
    assert_eq!(stats.disk_percent, None);
    assert_eq!(stats.total_users, None);
}

// ── User management ─────────────────────────────────────────────────

#[tokio::test]
async fn create_user_posts_add_client_payload() {
    let (server, connector) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/panel/api/inbounds/addClient"))
        .and(header("Cookie", "3x-ui=sess123"))
        .and(body_partial_json(json!({ "id": 3 })))
        .and(body_string_contains("uuid-alice"))
        .and(body_string_contains("totalGB"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "msg": "Client added", "obj": null })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let spec = UserSpec::new("alice")
        .with_data_limit(10 * 1024 * 1024 * 1024)
        .with_expire_at(1_700_000_000)
        .with_inbound(3, "uuid-alice");

    let user = connector.create_user(&spec).await.unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.client_id.as_deref(), Some("uuid-alice"));
    assert_eq!(user.data_limit, Some(10 * 1024 * 1024 * 1024));
}

#[tokio::test]
async fn create_user_without_inbound_fails_before_http() {
    let (server, connector) = setup().await;
    // No mocks mounted: the parameter check must reject first.
    drop(server);

    let spec = UserSpec::new("alice");
    let result = connector.create_user(&spec).await;
    assert!(
        matches!(result, Err(PanelError::InvalidParameters(_))),
        "expected InvalidParameters, got: {result:?}"
    );
}

#[tokio::test]
async fn create_user_refusal_surfaces_panel_message() {
    let (server, connector) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/panel/api/inbounds/addClient"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false, "msg": "Duplicate email: alice", "obj": null
        })))
        .mount(&server)
        .await;

    let spec = UserSpec::new("alice").with_inbound(3, "uuid-alice");
    match connector.create_user(&spec).await {
        Err(PanelError::RemoteHttp { message, .. }) => {
            assert_eq!(message, "Duplicate email: alice");
        }
        other => panic!("expected RemoteHttp, got: {other:?}"),
    }
}

#[tokio::test]
async fn delete_and_reset_hit_client_endpoints() {
    let (server, connector) = setup().await;
    mount_login(&server, 2).await;

    Mock::given(method("POST"))
        .and(path("/panel/api/inbounds/delClient/uuid-alice"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "obj": null })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/panel/api/inbounds/resetClientTraffic/uuid-alice"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "obj": null })),
        )
        .expect(1)
        .mount(&server)
        .await;

    connector.delete_user("uuid-alice").await.unwrap();
    connector.reset_user_traffic("uuid-alice").await.unwrap();
}

// ── Admin management ────────────────────────────────────────────────

#[tokio::test]
async fn list_admins_probes_api_and_returns_login_account() {
    let (server, connector) = setup().await;
    mount_login(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/panel/api/inbounds/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inbound_list_body()))
        .expect(1)
        .mount(&server)
        .await;

    let admins = connector.list_admins().await.unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].username, "admin");
    assert!(admins[0].is_sudo);
}

#[tokio::test]
async fn admin_mutations_are_unsupported() {
    let (server, connector) = setup().await;
    drop(server);

    let spec = panelbridge::AdminSpec {
        username: "second".to_string(),
        password: Some("pw".to_string()),
        is_sudo: false,
        telegram_id: None,
    };

    assert!(matches!(
        connector.create_admin(&spec).await,
        Err(PanelError::Unsupported { kind: "threexui", operation: "CreateAdmin" })
    ));
    assert!(matches!(
        connector.delete_admin("second").await,
        Err(PanelError::Unsupported { .. })
    ));
    assert!(matches!(
        connector.list_nodes().await,
        Err(PanelError::Unsupported { operation: "ListNodes", .. })
    ));
}

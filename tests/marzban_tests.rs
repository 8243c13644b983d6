#![allow(clippy::unwrap_used)]
// Integration tests for the Marzban connector using wiremock.

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use panelbridge::core::config::PanelConfig;
use panelbridge::core::traits::{AdminManagement, SystemInspection, UserManagement};
use panelbridge::panels::marzban::{self, MarzbanConnector};
use panelbridge::{PanelError, UserSpec, UserStatus};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, MarzbanConnector<panelbridge::core::kernel::ReqwestRest>) {
    let server = MockServer::start().await;
    let config = PanelConfig::new(server.uri(), "admin", "secret-pw".to_string());
    let connector = marzban::build_connector(config).unwrap();
    (server, connector)
}

async fn mount_token(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/admin/token"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=admin"))
        .and(body_string_contains("password=secret-pw"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-123", "token_type": "bearer"
        })))
        .expect(times)
        .mount(server)
        .await;
}

fn bearer() -> wiremock::matchers::HeaderExactMatcher {
    header("Authorization", "Bearer tok-123")
}

// ── Session acquisition ─────────────────────────────────────────────

#[tokio::test]
async fn rejected_token_request_is_invalid_credentials() {
    let (server, connector) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect username or password"
        })))
        .mount(&server)
        .await;

    match connector.list_admins().await {
        Err(PanelError::InvalidCredentials(msg)) => {
            assert_eq!(msg, "Incorrect username or password");
        }
        other => panic!("expected InvalidCredentials, got: {other:?}"),
    }
}

#[tokio::test]
async fn token_response_without_access_token_is_malformed() {
    let (server, connector) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token_type": "bearer" })))
        .mount(&server)
        .await;

    let result = connector.list_admins().await;
    assert!(
        matches!(result, Err(PanelError::MalformedResponse(_))),
        "expected MalformedResponse, got: {result:?}"
    );
}

// ── User management ─────────────────────────────────────────────────

#[tokio::test]
async fn create_user_defaults_reset_strategy_and_status() {
    let (server, connector) = setup().await;
    // Exactly one login and one create call.
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/user"))
        .and(bearer())
        .and(body_partial_json(json!({
            "username": "alice",
            "data_limit": 10_737_418_240_u64,
            "expire": null,
            "data_limit_reset_strategy": "no_reset",
            "status": "active"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "alice",
            "status": "active",
            "data_limit": 10_737_418_240_u64,
            "used_traffic": 0,
            "expire": null,
            "subscription_url": "/sub/alice-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let spec = UserSpec::new("alice").with_data_limit(10 * 1024 * 1024 * 1024);
    let user = connector.create_user(&spec).await.unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.status, Some(UserStatus::Active));
    assert_eq!(user.subscription_url.as_deref(), Some("/sub/alice-token"));
}

#[tokio::test]
async fn update_user_puts_partial_body() {
    let (server, connector) = setup().await;
    mount_token(&server, 1).await;

    Mock::given(method("PUT"))
        .and(path("/api/user/alice"))
        .and(bearer())
        .and(body_partial_json(json!({ "status": "disabled" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "alice", "status": "disabled"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut spec = UserSpec::new("alice");
    spec.status = Some(UserStatus::Disabled);

    let user = connector.update_user("alice", &spec).await.unwrap();
    assert_eq!(user.status, Some(UserStatus::Disabled));
}

#[tokio::test]
async fn delete_and_reset_hit_user_endpoints() {
    let (server, connector) = setup().await;
    mount_token(&server, 2).await;

    Mock::given(method("DELETE"))
        .and(path("/api/user/alice"))
        .and(bearer())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/user/alice/reset"))
        .and(bearer())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    connector.delete_user("alice").await.unwrap();
    connector.reset_user_traffic("alice").await.unwrap();
}

#[tokio::test]
async fn conflict_surfaces_detail_message() {
    let (server, connector) = setup().await;
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "detail": "User already exists"
        })))
        .mount(&server)
        .await;

    let spec = UserSpec::new("alice");
    match connector.create_user(&spec).await {
        Err(PanelError::RemoteHttp { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "User already exists");
        }
        other => panic!("expected RemoteHttp, got: {other:?}"),
    }
}

// ── System stats ────────────────────────────────────────────────────

#[tokio::test]
async fn system_stats_merge_host_metrics_and_user_counts() {
    let (server, connector) = setup().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/system"))
        .and(bearer())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "0.8.4",
            "mem_total": 4000,
            "mem_used": 1000,
            "cpu_usage": 37.5
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(bearer())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 3,
            "users": [
                { "username": "a", "status": "active" },
                { "username": "b", "status": "expired" },
                { "username": "c", "status": "active" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stats = connector.system_stats().await.unwrap();

    assert_eq!(stats.version.as_deref(), Some("0.8.4"));
    assert_eq!(stats.cpu_percent, Some(37.5));
    assert_eq!(stats.memory_percent, Some(25.0));
    assert_eq!(stats.disk_percent, None);
    assert_eq!(stats.total_users, Some(3));
    assert_eq!(stats.active_users, Some(2));
    assert_eq!(stats.expired_users, Some(1));
}

// ── Inbounds, admins, nodes ─────────────────────────────────────────

#[tokio::test]
async fn list_inbounds_flattens_protocol_groups() {
    let (server, connector) = setup().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/inbounds"))
        .and(bearer())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vless": [{ "tag": "VLESS TCP", "port": 443 }],
            "shadowsocks": [{ "tag": "SS", "port": 1080 }]
        })))
        .mount(&server)
        .await;

    let mut inbounds = connector.list_inbounds().await.unwrap();
    inbounds.sort_by(|a, b| a.tag.cmp(&b.tag));

    assert_eq!(inbounds.len(), 2);
    assert_eq!(inbounds[0].tag, "SS");
    assert_eq!(inbounds[0].protocol, "shadowsocks");
    assert_eq!(inbounds[1].port, Some(443));
}

#[tokio::test]
async fn admin_lifecycle_uses_admin_endpoints() {
    let (server, connector) = setup().await;
    mount_token(&server, 3).await;

    Mock::given(method("GET"))
        .and(path("/api/admins"))
        .and(bearer())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "username": "root", "is_sudo": true, "telegram_id": null },
            { "username": "ops", "is_sudo": false, "telegram_id": 42 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/admin"))
        .and(body_partial_json(json!({ "username": "ops2", "is_sudo": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "ops2", "is_sudo": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/admin/ops2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let admins = connector.list_admins().await.unwrap();
    assert_eq!(admins.len(), 2);
    assert_eq!(admins[1].telegram_id, Some(42));

    let spec = panelbridge::AdminSpec {
        username: "ops2".to_string(),
        password: Some("pw".to_string()),
        is_sudo: false,
        telegram_id: None,
    };
    let created = connector.create_admin(&spec).await.unwrap();
    assert_eq!(created.username, "ops2");

    connector.delete_admin("ops2").await.unwrap();
}

#[tokio::test]
async fn list_nodes_converts_entries() {
    let (server, connector) = setup().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/nodes"))
        .and(bearer())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "de-1", "address": "10.0.0.2", "port": 62050,
              "status": "connected", "xray_version": "1.8.4" }
        ])))
        .mount(&server)
        .await;

    let nodes = connector.list_nodes().await.unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "de-1");
    assert_eq!(nodes[0].status.as_deref(), Some("connected"));
}

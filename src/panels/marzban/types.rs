use serde::Deserialize;

/// Reply of `POST /api/admin/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarzbanToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// Host metrics from `GET /api/system`. Marzban versions differ in which
/// fields they expose, so everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarzbanSystemInfo {
    pub version: Option<String>,
    pub uptime: Option<u64>,
    pub cpu_usage: Option<f64>,
    pub mem_total: Option<u64>,
    pub mem_used: Option<u64>,
    pub disk_total: Option<u64>,
    pub disk_used: Option<u64>,
    pub total_user: Option<u64>,
    pub users_active: Option<u64>,
}

/// Page of users from `GET /api/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarzbanUserList {
    #[serde(default)]
    pub users: Vec<MarzbanUser>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarzbanUser {
    pub username: String,
    pub status: Option<String>,
    pub data_limit: Option<u64>,
    pub used_traffic: Option<u64>,
    /// Unix seconds; null means never.
    pub expire: Option<i64>,
    pub data_limit_reset_strategy: Option<String>,
    pub subscription_url: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarzbanAdmin {
    pub username: String,
    #[serde(default)]
    pub is_sudo: bool,
    pub telegram_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarzbanNode {
    pub id: Option<i64>,
    pub name: String,
    pub address: String,
    pub port: Option<u16>,
    pub status: Option<String>,
    pub xray_version: Option<String>,
}

use crate::core::config::{normalize_base_url, ConfigError};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Supported panel products.
///
/// This is a closed set: adding a backend means adding a variant here and a
/// connector module under `panels/`, checked at compile time. An
/// unrecognized kind string is a configuration error, never a silent
/// fallback to some default backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    #[serde(rename = "threexui")]
    ThreeXUi,
    Marzban,
}

impl PanelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThreeXUi => "threexui",
            Self::Marzban => "marzban",
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PanelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "threexui" | "3x-ui" => Ok(Self::ThreeXUi),
            "marzban" => Ok(Self::Marzban),
            other => Err(ConfigError::UnknownPanelKind(other.to_string())),
        }
    }
}

/// One remote panel instance as stored by the surrounding application.
///
/// Read-only to this crate; the storage layer owns it. The base URL is
/// normalized on construction so request URLs can be built by plain
/// concatenation.
#[derive(Debug, Clone)]
pub struct PanelRecord {
    pub id: i64,
    pub kind: PanelKind,
    pub base_url: String,
    pub username: String,
    pub password: Secret<String>,
}

impl PanelRecord {
    #[must_use]
    pub fn new(
        id: i64,
        kind: PanelKind,
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: String,
    ) -> Self {
        Self {
            id,
            kind,
            base_url: normalize_base_url(&base_url.into()),
            username: username.into(),
            password: Secret::new(password),
        }
    }
}

/// Result of probing a panel's reachability and credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub message: String,
}

impl ConnectionStatus {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            connected: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            connected: false,
            message: message.into(),
        }
    }
}

/// Backend-agnostic system statistics.
///
/// Every field is optional: a backend that cannot report a value reports
/// `None`. Values are never invented to look plausible.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SystemStats {
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
    pub disk_percent: Option<f64>,
    pub uptime_secs: Option<u64>,
    pub version: Option<String>,
    pub total_users: Option<u64>,
    pub active_users: Option<u64>,
    pub expired_users: Option<u64>,
    pub inbounds: Option<u64>,
}

/// A configured listener/proxy entry on a panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Inbound {
    pub id: String,
    pub tag: String,
    pub protocol: String,
    pub port: Option<u16>,
    pub enabled: bool,
    pub total_clients: Option<u64>,
}

/// Lifecycle state of a managed user on a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Disabled,
    Limited,
    Expired,
    OnHold,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
            Self::Limited => "limited",
            Self::Expired => "expired",
            Self::OnHold => "on_hold",
        }
    }
}

/// When a panel resets a user's consumed traffic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficResetStrategy {
    NoReset,
    Day,
    Week,
    Month,
    Year,
}

impl TrafficResetStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoReset => "no_reset",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Attributes for creating or updating a managed user.
///
/// Backend-specific fields are optional: `inbound_id`/`client_id` only
/// matter to 3x-ui, `proxies` is passed through to Marzban untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSpec {
    pub username: String,
    /// Traffic allowance in bytes. `None` means unlimited.
    pub data_limit: Option<u64>,
    /// Expiry as a unix timestamp in seconds. `None` means never.
    pub expire_at: Option<i64>,
    pub reset_strategy: Option<TrafficResetStrategy>,
    pub status: Option<UserStatus>,
    /// 3x-ui: the inbound the client is attached to.
    pub inbound_id: Option<u64>,
    /// 3x-ui: the client UUID. Generated by the caller.
    pub client_id: Option<String>,
    pub note: Option<String>,
    /// Marzban: proxy settings forwarded verbatim.
    pub proxies: Option<Value>,
}

impl UserSpec {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            data_limit: None,
            expire_at: None,
            reset_strategy: None,
            status: None,
            inbound_id: None,
            client_id: None,
            note: None,
            proxies: None,
        }
    }

    #[must_use]
    pub fn with_data_limit(mut self, bytes: u64) -> Self {
        self.data_limit = Some(bytes);
        self
    }

    #[must_use]
    pub fn with_expire_at(mut self, unix_secs: i64) -> Self {
        self.expire_at = Some(unix_secs);
        self
    }

    #[must_use]
    pub fn with_inbound(mut self, inbound_id: u64, client_id: impl Into<String>) -> Self {
        self.inbound_id = Some(inbound_id);
        self.client_id = Some(client_id.into());
        self
    }
}

/// A provisioned account on a panel, as reported back by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagedUser {
    pub username: String,
    pub status: Option<UserStatus>,
    pub data_limit: Option<u64>,
    pub used_traffic: Option<u64>,
    pub expire_at: Option<i64>,
    pub subscription_url: Option<String>,
    pub client_id: Option<String>,
}

/// Attributes for creating or updating a panel administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSpec {
    pub username: String,
    pub password: Option<String>,
    pub is_sudo: bool,
    pub telegram_id: Option<i64>,
}

/// An administrator account on a panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminAccount {
    pub username: String,
    pub is_sudo: bool,
    pub telegram_id: Option<i64>,
}

/// A worker node attached to a panel (Marzban only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeInfo {
    pub id: Option<i64>,
    pub name: String,
    pub address: String,
    pub port: Option<u16>,
    pub status: Option<String>,
    pub xray_version: Option<String>,
}

/// Shared numeric helpers for converters.
pub mod conversion {
    /// Percentage of `used` over `total`, or `None` when the total is
    /// missing or zero.
    pub fn percent(used: Option<u64>, total: Option<u64>) -> Option<f64> {
        match (used, total) {
            (Some(used), Some(total)) if total > 0 => {
                Some((used as f64 / total as f64) * 100.0)
            }
            _ => None,
        }
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every 3x-ui API reply is wrapped in this envelope. A 2xx status with
/// `success == false` is an application-layer refusal.
#[derive(Debug, Clone, Deserialize)]
pub struct XuiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub obj: Value,
}

/// An inbound entry as returned by `/panel/api/inbounds/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct XuiInbound {
    pub id: i64,
    #[serde(default)]
    pub remark: String,
    pub protocol: String,
    pub port: u16,
    #[serde(default)]
    pub enable: bool,
    /// JSON-encoded string, not an object. 3x-ui stores inbound settings
    /// (including the client list) as serialized text.
    #[serde(default)]
    pub settings: String,
    #[serde(rename = "clientStats", default)]
    pub client_stats: Option<Vec<XuiClientStat>>,
}

/// Per-client traffic counters attached to an inbound.
#[derive(Debug, Clone, Deserialize)]
pub struct XuiClientStat {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub up: u64,
    #[serde(default)]
    pub down: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(rename = "expiryTime", default)]
    pub expiry_time: i64,
    #[serde(default)]
    pub enable: bool,
}

/// A client entry as sent to `addClient`/`updateClient`. The panel expects
/// this nested inside a JSON-encoded `settings` string, see the rest layer.
#[derive(Debug, Clone, Serialize)]
pub struct XuiClient {
    /// Client UUID.
    pub id: String,
    /// 3x-ui identifies clients by their `email` field; the dashboard maps
    /// the abstract username onto it.
    pub email: String,
    /// Field name notwithstanding, the panel stores plain bytes here.
    #[serde(rename = "totalGB")]
    pub total_gb: u64,
    /// Expiry as unix milliseconds; 0 means never.
    #[serde(rename = "expiryTime")]
    pub expiry_time: i64,
    pub enable: bool,
    #[serde(default)]
    pub flow: String,
}

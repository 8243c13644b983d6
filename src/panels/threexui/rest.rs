use crate::core::errors::PanelError;
use crate::core::kernel::{RestClient, Session};
use crate::panels::threexui::types::{XuiClient, XuiEnvelope, XuiInbound};
use serde_json::{json, Value};
use std::sync::Arc;

/// Thin typed wrapper around `RestClient` for the 3x-ui API.
///
/// Holds the endpoint map; session acquisition and type conversion live in
/// the connector.
pub struct ThreeXUiRestClient<R: RestClient> {
    client: Arc<R>,
}

impl<R: RestClient> ThreeXUiRestClient<R> {
    pub fn new(client: Arc<R>) -> Self {
        Self { client }
    }

    /// List all inbounds, including per-client traffic stats.
    pub async fn list_inbounds(&self, session: &Session) -> Result<Vec<XuiInbound>, PanelError> {
        let value = self
            .client
            .get("/panel/api/inbounds/list", Some(session))
            .await?;
        let obj = Self::unwrap_envelope(value)?;
        serde_json::from_value(obj).map_err(|e| {
            PanelError::MalformedResponse(format!("unexpected inbound list shape: {}", e))
        })
    }

    /// Add a client to an inbound.
    pub async fn add_client(
        &self,
        session: &Session,
        inbound_id: u64,
        client: &XuiClient,
    ) -> Result<(), PanelError> {
        let body = Self::client_payload(inbound_id, client)?;
        let value = self
            .client
            .post("/panel/api/inbounds/addClient", &body, Some(session))
            .await?;
        Self::unwrap_envelope(value).map(|_| ())
    }

    /// Replace a client identified by its UUID.
    pub async fn update_client(
        &self,
        session: &Session,
        client_id: &str,
        inbound_id: u64,
        client: &XuiClient,
    ) -> Result<(), PanelError> {
        let body = Self::client_payload(inbound_id, client)?;
        let endpoint = format!("/panel/api/inbounds/updateClient/{}", client_id);
        let value = self.client.post(&endpoint, &body, Some(session)).await?;
        Self::unwrap_envelope(value).map(|_| ())
    }

    /// Remove a client identified by its UUID.
    pub async fn delete_client(&self, session: &Session, client_id: &str) -> Result<(), PanelError> {
        let endpoint = format!("/panel/api/inbounds/delClient/{}", client_id);
        let value = self.client.post(&endpoint, &json!({}), Some(session)).await?;
        Self::unwrap_envelope(value).map(|_| ())
    }

    /// Zero a client's traffic counters.
    pub async fn reset_client_traffic(
        &self,
        session: &Session,
        client_id: &str,
    ) -> Result<(), PanelError> {
        let endpoint = format!("/panel/api/inbounds/resetClientTraffic/{}", client_id);
        let value = self.client.post(&endpoint, &json!({}), Some(session)).await?;
        Self::unwrap_envelope(value).map(|_| ())
    }

    /// The panel expects the client list as a JSON-encoded *string* under
    /// `settings`, not as a nested object.
    fn client_payload(inbound_id: u64, client: &XuiClient) -> Result<Value, PanelError> {
        let settings = serde_json::to_string(&json!({ "clients": [client] }))
            .map_err(|e| PanelError::InvalidParameters(format!("client not serializable: {}", e)))?;
        Ok(json!({ "id": inbound_id, "settings": settings }))
    }

    /// Unwrap the `{success, msg, obj}` envelope. A refusal with 2xx status
    /// is still a remote error; surface the panel's own message.
    fn unwrap_envelope(value: Value) -> Result<Value, PanelError> {
        let envelope: XuiEnvelope = serde_json::from_value(value).map_err(|e| {
            PanelError::MalformedResponse(format!("missing 3x-ui response envelope: {}", e))
        })?;

        if !envelope.success {
            let message = if envelope.msg.is_empty() {
                "operation rejected by panel".to_string()
            } else {
                envelope.msg
            };
            return Err(PanelError::RemoteHttp {
                status: 200,
                message,
            });
        }

        Ok(envelope.obj)
    }
}

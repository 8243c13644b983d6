use crate::core::errors::PanelError;
use crate::core::kernel::{RestClient, Session};
use crate::panels::marzban::types::{
    MarzbanAdmin, MarzbanNode, MarzbanSystemInfo, MarzbanUser, MarzbanUserList,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Thin typed wrapper around `RestClient` for the Marzban API.
pub struct MarzbanRestClient<R: RestClient> {
    client: Arc<R>,
}

impl<R: RestClient> MarzbanRestClient<R> {
    pub fn new(client: Arc<R>) -> Self {
        Self { client }
    }

    /// Get host metrics
    pub async fn get_system(&self, session: &Session) -> Result<MarzbanSystemInfo, PanelError> {
        self.client.get_json("/api/system", Some(session)).await
    }

    /// List all users
    pub async fn list_users(&self, session: &Session) -> Result<MarzbanUserList, PanelError> {
        self.client.get_json("/api/users", Some(session)).await
    }

    /// List inbounds, keyed by protocol in the raw reply
    pub async fn list_inbounds(&self, session: &Session) -> Result<Value, PanelError> {
        self.client.get("/api/inbounds", Some(session)).await
    }

    /// Create a user
    pub async fn create_user(
        &self,
        session: &Session,
        body: &Value,
    ) -> Result<MarzbanUser, PanelError> {
        self.client.post_json("/api/user", body, Some(session)).await
    }

    /// Modify an existing user
    pub async fn update_user(
        &self,
        session: &Session,
        username: &str,
        body: &Value,
    ) -> Result<MarzbanUser, PanelError> {
        let endpoint = format!("/api/user/{}", username);
        self.client.put_json(&endpoint, body, Some(session)).await
    }

    /// Remove a user
    pub async fn delete_user(&self, session: &Session, username: &str) -> Result<(), PanelError> {
        let endpoint = format!("/api/user/{}", username);
        self.client.delete(&endpoint, Some(session)).await.map(|_| ())
    }

    /// Zero a user's traffic counters
    pub async fn reset_user_traffic(
        &self,
        session: &Session,
        username: &str,
    ) -> Result<(), PanelError> {
        let endpoint = format!("/api/user/{}/reset", username);
        self.client
            .post(&endpoint, &json!({}), Some(session))
            .await
            .map(|_| ())
    }

    /// List administrator accounts
    pub async fn list_admins(&self, session: &Session) -> Result<Vec<MarzbanAdmin>, PanelError> {
        self.client.get_json("/api/admins", Some(session)).await
    }

    /// Create an administrator
    pub async fn create_admin(
        &self,
        session: &Session,
        body: &Value,
    ) -> Result<MarzbanAdmin, PanelError> {
        self.client.post_json("/api/admin", body, Some(session)).await
    }

    /// Modify an administrator
    pub async fn update_admin(
        &self,
        session: &Session,
        username: &str,
        body: &Value,
    ) -> Result<MarzbanAdmin, PanelError> {
        let endpoint = format!("/api/admin/{}", username);
        self.client.put_json(&endpoint, body, Some(session)).await
    }

    /// Remove an administrator
    pub async fn delete_admin(&self, session: &Session, username: &str) -> Result<(), PanelError> {
        let endpoint = format!("/api/admin/{}", username);
        self.client.delete(&endpoint, Some(session)).await.map(|_| ())
    }

    /// List worker nodes
    pub async fn list_nodes(&self, session: &Session) -> Result<Vec<MarzbanNode>, PanelError> {
        self.client.get_json("/api/nodes", Some(session)).await
    }
}
